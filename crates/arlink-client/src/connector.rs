//! Session bootstrap: discovery handshake plus UDP link setup.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tracing::info;

use arlink_catalog::{builtin, MessageCatalog};
use arlink_transport::{DatagramLink, DiscoveryStream, UdpLink};

use crate::connection::Connection;
use crate::error::Result;
use crate::handshake::{negotiate, ConnectRequest, DISCOVERY_PORT};
use crate::watchdog::{LivenessWatchdog, DEFAULT_LIVENESS_TIMEOUT};

/// How to reach and identify to a device.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// Device address (drone or controller).
    pub device: IpAddr,
    /// Discovery TCP port, [`DISCOVERY_PORT`] unless the device says otherwise.
    pub discovery_port: u16,
    /// Name shown in the device's UI.
    pub controller_name: String,
    /// Deadline for the TCP discovery exchange.
    pub handshake_timeout: Duration,
    /// Inactivity window before the connection is declared dead.
    pub liveness_timeout: Duration,
}

impl ConnectConfig {
    pub fn new(device: IpAddr) -> Self {
        Self {
            device,
            discovery_port: DISCOVERY_PORT,
            controller_name: "arlink".to_string(),
            handshake_timeout: Duration::from_secs(5),
            liveness_timeout: DEFAULT_LIVENESS_TIMEOUT,
        }
    }
}

/// Establish a session with the built-in catalog.
///
/// Binds the local UDP port first so it can be advertised, runs the TCP
/// discovery exchange, points the UDP link at the negotiated `c2d_port`,
/// and wraps everything in a ready [`Connection`].
pub fn connect(config: &ConnectConfig) -> Result<Connection<UdpLink>> {
    connect_with_catalog(config, builtin::builtin())
}

pub fn connect_with_catalog(
    config: &ConnectConfig,
    catalog: MessageCatalog,
) -> Result<Connection<UdpLink>> {
    let mut link = UdpLink::bind()?;

    let discovery = SocketAddr::from((config.device, config.discovery_port));
    let mut stream = DiscoveryStream::connect(discovery, config.handshake_timeout)?;
    let request = ConnectRequest::new(config.controller_name.clone(), link.local_port());
    let response = negotiate(&mut stream, &request)?;
    drop(stream);

    link.connect(SocketAddr::from((config.device, response.c2d_port)))?;
    info!(
        device = %config.device,
        c2d_port = response.c2d_port,
        d2c_port = link.local_port(),
        "session established"
    );

    Ok(Connection::new(
        link,
        catalog,
        LivenessWatchdog::new(config.liveness_timeout),
    ))
}
