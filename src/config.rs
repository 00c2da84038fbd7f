//! Discovery configuration, built once at startup and passed down.

use std::path::PathBuf;
use std::time::Duration;

use crate::types::Protocol;

pub const DEFAULT_PRIMARY: &str = "ss";
pub const DEFAULT_FALLBACK: &str = "lsof";
pub const DEFAULT_SERVICES: &str = "/etc/services";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub include_tcp: bool,
    pub include_udp: bool,
    /// Path or name of the `ss` binary.
    pub primary_tool: PathBuf,
    /// Path or name of the `lsof` binary.
    pub fallback_tool: PathBuf,
    pub services_file: PathBuf,
    /// Upper bound on each external command.
    pub timeout: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            include_tcp: true,
            include_udp: true,
            primary_tool: PathBuf::from(DEFAULT_PRIMARY),
            fallback_tool: PathBuf::from(DEFAULT_FALLBACK),
            services_file: PathBuf::from(DEFAULT_SERVICES),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl DiscoveryConfig {
    pub fn with_protocols(mut self, include_tcp: bool, include_udp: bool) -> Self {
        self.include_tcp = include_tcp;
        self.include_udp = include_udp;
        self
    }

    /// Requested protocols in query order.
    pub fn protocols(&self) -> Vec<Protocol> {
        let mut protocols = Vec::with_capacity(2);
        if self.include_tcp {
            protocols.push(Protocol::Tcp);
        }
        if self.include_udp {
            protocols.push(Protocol::Udp);
        }
        protocols
    }
}
