//! Service-name lookup backed by the host's services database.
//!
//! The file uses the classic `/etc/services` layout:
//! `name  port/proto  [aliases...]  [# comment]`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::types::Protocol;

#[derive(Debug, Clone, Default)]
pub struct ServiceDatabase {
    entries: HashMap<(u16, Protocol), String>,
}

impl ServiceDatabase {
    /// Load the database; an unreadable file yields an empty database.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Services database unavailable");
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Self {
        let mut entries = HashMap::new();

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or_default();
            let mut parts = line.split_whitespace();
            let (Some(name), Some(port_proto)) = (parts.next(), parts.next()) else {
                continue;
            };
            let Some((port, proto)) = port_proto.split_once('/') else {
                continue;
            };
            let (Ok(port), Ok(proto)) = (port.parse::<u16>(), proto.parse::<Protocol>()) else {
                continue;
            };

            // First entry wins, matching getservbyport.
            entries
                .entry((port, proto))
                .or_insert_with(|| name.to_string());
        }

        Self { entries }
    }

    pub fn lookup(&self, port: u16, protocol: Protocol) -> Option<String> {
        self.entries.get(&(port, protocol)).cloned()
    }
}

#[cfg(test)]
impl ServiceDatabase {
    /// Lookup by raw protocol token; anything unrecognized is "no name".
    fn resolve(&self, port: u16, protocol: &str) -> Option<String> {
        let protocol = protocol.parse::<Protocol>().ok()?;
        self.lookup(port, protocol)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
