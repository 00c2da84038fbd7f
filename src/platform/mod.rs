//! Socket-table sources and the logic that picks between them.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::Error;
use crate::services::ServiceDatabase;
use crate::types::{PortBinding, Protocol};

mod lsof;
mod runner;
mod ss;

pub use lsof::LsofSource;
pub use runner::{CommandRunner, SystemRunner};
pub use ss::SsSource;

/// An external tool that can list listening sockets for one protocol.
pub trait BindingSource {
    fn name(&self) -> &'static str;

    fn program(&self) -> &Path;

    fn args(&self, protocol: Protocol) -> &'static [&'static str];

    /// Parse the tool's output. Lines that don't fit the expected shape are
    /// skipped, never reported as errors.
    fn parse(
        &self,
        output: &str,
        protocol: Protocol,
        services: &ServiceDatabase,
    ) -> Vec<PortBinding>;

    /// Run the tool for one protocol. Any failure yields no bindings.
    fn query(
        &self,
        protocol: Protocol,
        runner: &dyn CommandRunner,
        services: &ServiceDatabase,
    ) -> Vec<PortBinding> {
        match runner.run(self.program(), self.args(protocol)) {
            Ok(output) => self.parse(&output, protocol, services),
            Err(Error::ToolMissing { program }) => {
                debug!(source = self.name(), %program, "Tool not installed");
                Vec::new()
            }
            // lsof exits 1 when nothing matches.
            Err(e @ Error::ToolFailed { .. }) => {
                debug!(source = self.name(), %protocol, error = %e, "Tool exited unsuccessfully");
                Vec::new()
            }
            Err(e) => {
                warn!(source = self.name(), %protocol, error = %e, "Tool query failed");
                Vec::new()
            }
        }
    }
}

/// The outcome of one discovery pass.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub bindings: Vec<PortBinding>,
    /// Name of the source whose output was used, if any produced data.
    pub source: Option<&'static str>,
}

/// Query `sources` in preference order and keep the first non-empty result.
///
/// Results from different sources are never combined: each tool exposes a
/// different subset of fields, and mixing them would report one socket twice
/// with inconsistent detail.
pub fn collect(
    sources: &[&dyn BindingSource],
    protocols: &[Protocol],
    runner: &dyn CommandRunner,
    services: &ServiceDatabase,
) -> Discovery {
    for source in sources {
        let bindings: Vec<PortBinding> = protocols
            .iter()
            .flat_map(|&protocol| source.query(protocol, runner, services))
            .collect();

        if bindings.is_empty() {
            debug!(source = source.name(), "No bindings, trying next source");
            continue;
        }

        debug!(source = source.name(), count = bindings.len(), "Using source");
        return Discovery {
            bindings: PortBinding::dedup_sorted(bindings),
            source: Some(source.name()),
        };
    }

    Discovery::default()
}

/// Split a trailing `:<digits>` port off an address.
///
/// Everything before the last colon is the address, so `[::1]:5432` yields
/// `("[::1]", 5432)`.
fn split_addr_port(value: &str) -> Option<(&str, u16)> {
    let (addr, port) = value.rsplit_once(':')?;
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((addr, port.parse().ok()?))
}
