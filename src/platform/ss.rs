//! Primary source: `ss` from iproute2.
//!
//! Each line looks like
//! `tcp LISTEN 0 128 0.0.0.0:22 0.0.0.0:* users:(("sshd",pid=450,fd=3))`.
//! The trailing process column is missing when the caller can't see the
//! owning process, and the leading Netid column is missing when `ss` is
//! asked for a single socket type.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use super::{split_addr_port, BindingSource};
use crate::services::ServiceDatabase;
use crate::types::{PortBinding, Protocol};

const TCP_ARGS: &[&str] = &["-H", "-l", "-n", "-p", "-t"];
const UDP_ARGS: &[&str] = &["-H", "-l", "-n", "-p", "-u"];

const MAX_FIELDS: usize = 7;
const MIN_FIELDS: usize = 6;

fn field_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

fn users_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\(\("(?P<name>[^"]+)"(?:,pid=(?P<pid>\d+))?"#).expect("valid regex")
    })
}

#[derive(Debug, Clone)]
pub struct SsSource {
    program: PathBuf,
}

impl SsSource {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl BindingSource for SsSource {
    fn name(&self) -> &'static str {
        "ss"
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
        parse_ss_output(output, protocol, services)
    }
}

fn parse_ss_output(output: &str, protocol: Protocol, services: &ServiceDatabase) -> Vec<PortBinding> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let parsed = parse_ss_line(line, protocol, services);
            if parsed.is_none() {
                trace!(line, "Skipping unparseable ss line");
            }
            parsed
        })
        .collect()
}

fn parse_ss_line(line: &str, queried: Protocol, services: &ServiceDatabase) -> Option<PortBinding> {
    let line = line.trim();
    let first = line.split_whitespace().next()?;

    // States are upper-case (LISTEN, UNCONN); netids are lower-case.
    let with_netid;
    let line = if is_state(first) {
        with_netid = format!("{} {}", queried, line);
        with_netid.as_str()
    } else {
        line
    };

    let fields: Vec<&str> = field_separator().splitn(line, MAX_FIELDS).collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let protocol: Protocol = fields[0].parse().ok()?;
    let state = fields[1];
    let (address, port) = split_addr_port(fields[4])?;
    let (process_name, pid) = fields
        .get(6)
        .map(|blob| parse_users(blob))
        .unwrap_or_default();

    Some(PortBinding {
        protocol,
        port,
        service_name: services.lookup(port, protocol),
        process_name,
        pid,
        state: state.to_string(),
        local_address: Some(address.to_string()),
    })
}

fn is_state(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_ascii_uppercase() || c == '-')
}

/// Extract the first process name and pid from `users:(("name",pid=N,fd=M))`.
fn parse_users(blob: &str) -> (Option<String>, Option<u32>) {
    let Some(caps) = users_pattern().captures(blob) else {
        return (None, None);
    };

    let name = caps.name("name").map(|m| m.as_str().to_string());
    let pid = caps
        .name("pid")
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|&pid| pid > 0);

    (name, pid)
}
