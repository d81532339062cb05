//! Serializable connector probe settings.

use crate::connector::{Connector, ConnectorPort, SSH_PORT, WINRM_PORT};
use crate::probe::PortProbe;
use crate::selector::ConnectorSelector;
use crate::Result;
use ridley_core::Error;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Ports and timeout used when choosing a connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ConnectorConfig {
    /// SSH port, probed first
    #[validate(range(min = 1))]
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,

    /// `WinRM` port, probed second
    #[validate(range(min = 1))]
    #[serde(default = "default_winrm_port")]
    pub winrm_port: u16,

    /// Per-port probe timeout in seconds
    #[validate(range(min = 1, max = 60))]
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

const fn default_ssh_port() -> u16 {
    SSH_PORT
}

const fn default_winrm_port() -> u16 {
    WINRM_PORT
}

const fn default_probe_timeout_secs() -> u64 {
    3
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            ssh_port: default_ssh_port(),
            winrm_port: default_winrm_port(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

impl ConnectorConfig {
    /// Run field validation, reporting failures as configuration errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing every invalid field.
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid connector configuration: {e}")))
    }

    /// Probe timeout as a Duration.
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Ports in probe order.
    #[must_use]
    pub const fn ports(&self) -> [ConnectorPort; 2] {
        [
            ConnectorPort::new(Connector::Ssh, self.ssh_port),
            ConnectorPort::new(Connector::WinRm, self.winrm_port),
        ]
    }

    /// Build a TCP selector from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if validation fails.
    pub fn selector(&self) -> Result<ConnectorSelector> {
        self.selector_with(crate::probe::TcpProbe)
    }

    /// Build a selector around a custom probe.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if validation fails.
    pub fn selector_with<P: PortProbe>(&self, probe: P) -> Result<ConnectorSelector<P>> {
        self.check()?;
        Ok(ConnectorSelector::with_probe(probe)
            .with_ports(self.ports())
            .with_timeout(self.probe_timeout()))
    }
}
