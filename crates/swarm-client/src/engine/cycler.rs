//! Deterministic endpoint rotation.
//!
//! Destination ports are swept from `min_port` to `max_port`. Each time the
//! sweep wraps, the source address advances to the next configured client
//! address; once the source addresses wrap back to the first one (or when
//! none are configured) the destination address advances too. The result is
//! an even spread over ports first, then source IPs, then destination IPs.

use std::net::IpAddr;
use swarm_common::Config;

/// A destination picked for one dial attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub ip: String,
    pub port: u16,
}

/// Everything a worker needs to dial: where to, and which local address
/// (if any) to bind first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub endpoint: Endpoint,
    pub local: Option<IpAddr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub target: Target,
    pub client_rotated: bool,
    pub server_rotated: bool,
}

pub struct EndpointCycler {
    server_addresses: Vec<String>,
    client_addresses: Vec<IpAddr>,
    min_port: u16,
    max_port: u16,
    // u32 so that stepping past u16::MAX is still representable.
    server_port: u32,
    client_index: usize,
    server_index: usize,
}

impl EndpointCycler {
    pub fn new(
        server_addresses: Vec<String>,
        client_addresses: Vec<IpAddr>,
        min_port: u16,
        max_port: u16,
    ) -> Self {
        assert!(!server_addresses.is_empty(), "no server addresses");
        assert!(min_port <= max_port, "empty port range");
        Self {
            server_addresses,
            client_addresses,
            min_port,
            max_port,
            server_port: u32::from(min_port),
            client_index: 0,
            server_index: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.server_addresses.clone(),
            config.client_addresses.clone(),
            config.load.min_port,
            config.load.max_port,
        )
    }

    /// Local address that subsequent dials bind to.
    pub fn client_address(&self) -> Option<IpAddr> {
        self.client_addresses.get(self.client_index).copied()
    }

    pub fn server_address(&self) -> &str {
        &self.server_addresses[self.server_index]
    }

    pub fn next(&mut self) -> Advance {
        let mut client_rotated = false;
        let mut server_rotated = false;

        if self.server_port > u32::from(self.max_port) {
            self.server_port = u32::from(self.min_port);
            if !self.client_addresses.is_empty() {
                self.client_index = (self.client_index + 1) % self.client_addresses.len();
                client_rotated = true;
            }
            if self.client_index == 0 {
                self.server_index = (self.server_index + 1) % self.server_addresses.len();
                server_rotated = true;
            }
        }

        // Bounded by max_port above.
        let port = self.server_port as u16;
        self.server_port += 1;

        Advance {
            target: Target {
                endpoint: Endpoint {
                    ip: self.server_addresses[self.server_index].clone(),
                    port,
                },
                local: self.client_address(),
            },
            client_rotated,
            server_rotated,
        }
    }
}
