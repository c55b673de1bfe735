//! UDP fan-out of per-frame robot observations.
//!
//! One socket, many collector endpoints. A send failure to one endpoint is
//! logged and never stops delivery to the rest; the sequence number advances
//! exactly once per frame regardless.

use std::collections::BTreeMap;
use std::net::{SocketAddr, UdpSocket};

use tracing::{debug, warn};

use crate::detect::{ObservationPacket, RobotObservation};
use crate::error::Result;

pub struct OutputFanout {
    socket: UdpSocket,
    endpoints: Vec<SocketAddr>,
    sequence: u64,
}

impl OutputFanout {
    pub fn new() -> Result<Self> {
        Ok(Self {
            socket: UdpSocket::bind("0.0.0.0:0")?,
            endpoints: Vec::new(),
            sequence: 0,
        })
    }

    /// Replace the endpoint set with the current collector registry.
    pub fn reconcile(&mut self, collectors: &BTreeMap<String, SocketAddr>) {
        let endpoints: Vec<SocketAddr> = collectors.values().copied().collect();
        if endpoints != self.endpoints {
            debug!(count = endpoints.len(), "collector endpoints updated");
            self.endpoints = endpoints;
        }
    }

    /// Serialize one frame's observations and send to every endpoint.
    pub fn send(&mut self, robots: &[RobotObservation]) -> Result<()> {
        let packet = ObservationPacket {
            sequence: self.sequence,
            robots,
        };
        let payload = serde_json::to_vec(&packet)?;
        self.sequence += 1;

        for endpoint in &self.endpoints {
            if let Err(err) = self.socket.send_to(&payload, endpoint) {
                warn!(%endpoint, %err, "collector send failed");
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn set_endpoints(&mut self, endpoints: Vec<SocketAddr>) {
        self.endpoints = endpoints;
    }
}
