//! TCP reachability probes.

use crate::Result;
use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};
use tracing::trace;

/// Answers whether a host accepts TCP connections on a port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortProbe: Send + Sync {
    /// Try to connect to `host:port` within `timeout`.
    ///
    /// A refused connection, an unreachable host or network, and a timeout
    /// all mean the port is closed.
    ///
    /// # Errors
    ///
    /// Returns [`ridley_core::Error::Io`] for any other socket failure, such
    /// as a host name that cannot be resolved.
    async fn port_open(&self, host: &str, port: u16, timeout: Duration) -> Result<bool>;
}

/// Probe that opens a real TCP connection and drops it immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProbe;

fn counts_as_closed(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::NetworkUnreachable
            | io::ErrorKind::TimedOut
    )
}

#[async_trait]
impl PortProbe for TcpProbe {
    async fn port_open(&self, host: &str, port: u16, timeout: Duration) -> Result<bool> {
        // Only the connect is bounded by the timeout.
        let addrs: Vec<SocketAddr> = lookup_host((host, port)).await?.collect();

        match tokio::time::timeout(timeout, TcpStream::connect(addrs.as_slice())).await {
            Ok(Ok(_stream)) => Ok(true),
            Ok(Err(err)) if counts_as_closed(err.kind()) => {
                trace!(host, port, error = %err, "Port closed");
                Ok(false)
            }
            Ok(Err(err)) => Err(err.into()),
            Err(_elapsed) => {
                trace!(host, port, ?timeout, "Port probe timed out");
                Ok(false)
            }
        }
    }
}
