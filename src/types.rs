//! Core data types for port bindings.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// One listening socket observed on the local host.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
pub struct PortBinding {
    pub protocol: Protocol,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub state: String,
    /// Bound interface address without the port suffix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_address: Option<String>,
}

impl PortBinding {
    /// Drop later duplicates, then sort by (protocol, port).
    ///
    /// Two records are the same binding when protocol, port, pid and process
    /// name agree; state and local address are not compared. The sort is
    /// stable, so records sharing a (protocol, port) keep first-seen order.
    pub fn dedup_sorted(bindings: Vec<PortBinding>) -> Vec<PortBinding> {
        let mut seen = HashSet::new();
        let mut unique: Vec<PortBinding> = Vec::with_capacity(bindings.len());

        for binding in bindings {
            let key = (
                binding.protocol,
                binding.port,
                binding.pid,
                binding.process_name.clone(),
            );
            if seen.insert(key) {
                unique.push(binding);
            }
        }

        unique.sort_by(|a, b| {
            a.protocol
                .as_str()
                .cmp(b.protocol.as_str())
                .then(a.port.cmp(&b.port))
        });
        unique
    }

    pub fn filter_port(bindings: &[PortBinding], port: u16) -> Vec<&PortBinding> {
        bindings.iter().filter(|b| b.port == port).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            _ => Err(()),
        }
    }
}
