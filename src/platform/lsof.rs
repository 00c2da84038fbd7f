//! Fallback source: `lsof`.
//!
//! Lines look like
//! `sshd 450 root 3u IPv4 12345 0t0 TCP *:22 (LISTEN)`; the column set
//! varies between platforms and versions, so fields are located by pattern
//! rather than position.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use super::BindingSource;
use crate::services::ServiceDatabase;
use crate::types::{PortBinding, Protocol};

const TCP_ARGS: &[&str] = &["-nP", "-iTCP", "-sTCP:LISTEN"];
const UDP_ARGS: &[&str] = &["-nP", "-iUDP"];

/// lsof's invocation filters only return listening sockets.
const LISTEN_STATE: &str = "LISTEN";

fn address_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:\*|\[[0-9A-Za-z:.%]+\]|\d{1,3}(?:\.\d{1,3}){3}):(\d+)")
            .expect("valid regex")
    })
}

#[derive(Debug, Clone)]
pub struct LsofSource {
    program: PathBuf,
}

impl LsofSource {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl BindingSource for LsofSource {
    fn name(&self) -> &'static str {
        "lsof"
    }

    fn program(&self) -> &Path {
        &self.program
    }

    fn args(&self, protocol: Protocol) -> &'static [&'static str] {
        match protocol {
            Protocol::Tcp => TCP_ARGS,
            Protocol::Udp => UDP_ARGS,
        }
    }

    fn parse(
        &self,
        output: &str,
        protocol: Protocol,
        services: &ServiceDatabase,
    ) -> Vec<PortBinding> {
        parse_lsof_output(output, protocol, services)
    }
}

fn parse_lsof_output(output: &str, protocol: Protocol, services: &ServiceDatabase) -> Vec<PortBinding> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with("COMMAND"))
        .filter_map(|line| {
            let parsed = parse_lsof_line(line, protocol, services);
            if parsed.is_none() {
                trace!(line, "Skipping unparseable lsof line");
            }
            parsed
        })
        .collect()
}

fn parse_lsof_line(line: &str, protocol: Protocol, services: &ServiceDatabase) -> Option<PortBinding> {
    let port: u16 = address_pattern()
        .captures(line)?
        .get(1)?
        .as_str()
        .parse()
        .ok()?;

    let mut tokens = line.split_whitespace();
    let command = tokens.next()?;
    let pid = tokens
        .find_map(|token| token.parse::<u32>().ok())
        .filter(|&pid| pid > 0);

    Some(PortBinding {
        protocol,
        port,
        service_name: services.lookup(port, protocol),
        process_name: Some(command.to_string()),
        pid,
        state: LISTEN_STATE.to_string(),
        local_address: None,
    })
}
