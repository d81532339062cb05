//! # ridley-core
//!
//! Core types and utilities for talking to a configuration-management server.
//!
//! This crate provides the shared error type, connection configuration, and the
//! HTTP transport consumed by the resource and connector crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status code mapping
//! - [`config`] - Serializable, validated connection configuration
//! - [`client`] - HTTP client tuning and defaults
//! - [`connection`] - The [`Connection`] trait and its reqwest implementation

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod connection;
pub mod error;

// Re-export commonly used types
pub use config::ConnectionConfig;
pub use connection::{Connection, HttpConnection, HttpConnectionBuilder};
pub use error::{Error, Result};

#[cfg(any(test, feature = "mock"))]
pub use connection::MockConnection;
