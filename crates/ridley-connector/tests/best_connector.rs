//! Connector selection against real loopback sockets.

use ridley_connector::{Connector, ConnectorPort, ConnectorSelector};
use ridley_core::Error;
use std::time::Duration;
use tokio::net::TcpListener;

async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn picks_winrm_when_ssh_is_closed() {
    let ssh = closed_port().await;
    let winrm = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let winrm_port = winrm.local_addr().unwrap().port();

    let selector = ConnectorSelector::new()
        .with_ports([
            ConnectorPort::new(Connector::Ssh, ssh),
            ConnectorPort::new(Connector::WinRm, winrm_port),
        ])
        .with_timeout(Duration::from_secs(1));

    assert_eq!(selector.best_for("127.0.0.1").await.unwrap(), Connector::WinRm);
}

#[tokio::test]
async fn picks_ssh_when_both_are_open() {
    let ssh = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let winrm = TcpListener::bind("127.0.0.1:0").await.unwrap();

    let selector = ConnectorSelector::new().with_ports([
        ConnectorPort::new(Connector::Ssh, ssh.local_addr().unwrap().port()),
        ConnectorPort::new(Connector::WinRm, winrm.local_addr().unwrap().port()),
    ]);

    assert_eq!(selector.best_for("127.0.0.1").await.unwrap(), Connector::Ssh);
    assert!(selector
        .port_open("127.0.0.1", winrm.local_addr().unwrap().port())
        .await
        .unwrap());
}

#[tokio::test]
async fn all_closed_is_unknown_connector() {
    let selector = ConnectorSelector::new()
        .with_ports([
            ConnectorPort::new(Connector::Ssh, closed_port().await),
            ConnectorPort::new(Connector::WinRm, closed_port().await),
        ])
        .with_timeout(Duration::from_secs(1));

    match selector.best_for("127.0.0.1").await {
        Err(Error::UnknownConnector { host }) => assert_eq!(host, "127.0.0.1"),
        other => panic!("expected UnknownConnector, got {other:?}"),
    }
}
