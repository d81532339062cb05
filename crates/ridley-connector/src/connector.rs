//! Connector identities and their default ports.

use ridley_core::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default SSH port.
pub const SSH_PORT: u16 = 22;

/// Default `WinRM` HTTP port.
pub const WINRM_PORT: u16 = 5985;

/// How long a single port probe may take before the port counts as closed.
pub const PORT_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// Probe order used when no explicit ports are configured.
pub const DEFAULT_CONNECTOR_PORTS: [ConnectorPort; 2] = [
    ConnectorPort::new(Connector::Ssh, SSH_PORT),
    ConnectorPort::new(Connector::WinRm, WINRM_PORT),
];

/// Remote administration channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connector {
    /// Secure shell
    Ssh,
    /// Windows Remote Management
    WinRm,
}

impl Connector {
    /// Well-known port for this connector.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Ssh => SSH_PORT,
            Self::WinRm => WINRM_PORT,
        }
    }

    /// Lowercase name used in configuration and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ssh => "ssh",
            Self::WinRm => "winrm",
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Connector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ssh" => Ok(Self::Ssh),
            "winrm" => Ok(Self::WinRm),
            other => Err(Error::ConfigError(format!("Unknown connector: {other}"))),
        }
    }
}

/// A connector paired with the port it is probed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorPort {
    /// Connector reported when the port is open
    pub connector: Connector,
    /// TCP port to probe
    pub port: u16,
}

impl ConnectorPort {
    /// Pair a connector with a port.
    #[must_use]
    pub const fn new(connector: Connector, port: u16) -> Self {
        Self { connector, port }
    }
}

impl From<Connector> for ConnectorPort {
    fn from(connector: Connector) -> Self {
        Self::new(connector, connector.default_port())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ports() {
        assert_eq!(Connector::Ssh.default_port(), 22);
        assert_eq!(Connector::WinRm.default_port(), 5985);
        assert_eq!(DEFAULT_CONNECTOR_PORTS[0].connector, Connector::Ssh);
        assert_eq!(DEFAULT_CONNECTOR_PORTS[1].connector, Connector::WinRm);
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("SSH".parse::<Connector>().unwrap(), Connector::Ssh);
        assert_eq!("winrm".parse::<Connector>().unwrap(), Connector::WinRm);
        assert!(matches!(
            "telnet".parse::<Connector>(),
            Err(Error::ConfigError(_))
        ));
        assert_eq!(Connector::WinRm.to_string(), "winrm");
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Connector::WinRm).unwrap();
        assert_eq!(json, "\"winrm\"");
        let parsed: ConnectorPort =
            serde_json::from_str(r#"{"connector":"ssh","port":2222}"#).unwrap();
        assert_eq!(parsed, ConnectorPort::new(Connector::Ssh, 2222));
    }
}
