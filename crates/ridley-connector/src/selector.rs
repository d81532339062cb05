//! Best-connector selection.

use crate::connector::{Connector, ConnectorPort, DEFAULT_CONNECTOR_PORTS, PORT_CHECK_TIMEOUT};
use crate::probe::{PortProbe, TcpProbe};
use crate::Result;
use ridley_core::Error;
use std::time::Duration;
use tracing::debug;

/// Picks the administration channel a host answers on.
///
/// Ports are probed one at a time in preference order and probing stops at
/// the first open port.
#[derive(Debug, Clone)]
pub struct ConnectorSelector<P: PortProbe = TcpProbe> {
    ports: Vec<ConnectorPort>,
    timeout: Duration,
    probe: P,
}

impl ConnectorSelector<TcpProbe> {
    /// Selector probing SSH on 22, then `WinRM` on 5985, over real TCP.
    #[must_use]
    pub fn new() -> Self {
        Self::with_probe(TcpProbe)
    }
}

impl Default for ConnectorSelector<TcpProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PortProbe> ConnectorSelector<P> {
    /// Selector with the default ports and a custom probe.
    #[must_use]
    pub fn with_probe(probe: P) -> Self {
        Self {
            ports: DEFAULT_CONNECTOR_PORTS.to_vec(),
            timeout: PORT_CHECK_TIMEOUT,
            probe,
        }
    }

    /// Replace the probe order.
    #[must_use]
    pub fn with_ports(mut self, ports: impl IntoIterator<Item = ConnectorPort>) -> Self {
        self.ports = ports.into_iter().collect();
        self
    }

    /// Set the per-port probe timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ports probed, in order.
    #[must_use]
    pub fn ports(&self) -> &[ConnectorPort] {
        &self.ports
    }

    /// Per-port probe timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether `host` accepts a TCP connection on `port`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] for socket failures other than a refused,
    /// unreachable or timed out connection.
    pub async fn port_open(&self, host: &str, port: u16) -> Result<bool> {
        self.probe.port_open(host, port, self.timeout).await
    }

    /// First connector whose port is open on `host`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownConnector`] if no port is open, or the probe's
    /// error if a probe fails outright.
    pub async fn best_for(&self, host: &str) -> Result<Connector> {
        for candidate in &self.ports {
            let open = self.port_open(host, candidate.port).await?;
            debug!(
                host,
                connector = %candidate.connector,
                port = candidate.port,
                open,
                "Probed connector port"
            );

            if open {
                return Ok(candidate.connector);
            }
        }

        Err(Error::UnknownConnector {
            host: host.to_string(),
        })
    }
}
