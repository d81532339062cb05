//! Administrative connector selection for managed hosts.
//!
//! A [`ConnectorSelector`] probes a host's well-known management ports in
//! preference order (SSH, then `WinRM`) and reports the first one that accepts
//! a TCP connection.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod connector;
pub mod probe;
pub mod selector;

pub use config::ConnectorConfig;
pub use connector::{Connector, ConnectorPort, DEFAULT_CONNECTOR_PORTS, PORT_CHECK_TIMEOUT};
pub use probe::{PortProbe, TcpProbe};
pub use selector::ConnectorSelector;

#[cfg(test)]
pub use probe::MockPortProbe;

/// Result alias reusing the shared Ridley error type.
pub type Result<T> = ridley_core::Result<T>;
