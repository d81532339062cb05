//! Typed CRUD mapping for configuration-management REST collections.
//!
//! A [`ResourceClient`] binds a [`ResourceKind`] to a
//! [`Connection`](ridley_core::Connection) and turns the remote collection
//! into [`Entity`] values that compare and hash by identity.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod attributes;
pub mod client;
pub mod entity;
pub mod kind;
pub mod kinds;

pub use attributes::AttributeMap;
pub use client::ResourceClient;
pub use entity::{Entity, Reference};
pub use kind::{ResourceDescriptor, ResourceKind};
pub use kinds::{
    ApiClient, ClientKind, DataBag, DataBagKind, Environment, EnvironmentKind, Node, NodeKind,
    Role, RoleKind,
};

/// Convenient result alias that reuses the shared Ridley error type.
pub type Result<T> = ridley_core::Result<T>;
