//! Plain-text summary of what is bound to a single port.

use crate::types::PortBinding;

const UNKNOWN: &str = "unknown";
const NO_PID: &str = "?";

pub fn describe_port(port: u16, bindings: &[PortBinding]) -> String {
    let matching = PortBinding::filter_port(bindings, port);

    if matching.is_empty() {
        return format!("No process is currently listening on port {}.", port);
    }

    matching
        .iter()
        .map(|b| {
            let pid = b.pid.map(|p| p.to_string());
            format!(
                "{} port {} ({}): process {} (pid {}), state {}",
                b.protocol,
                b.port,
                b.service_name.as_deref().unwrap_or(UNKNOWN),
                b.process_name.as_deref().unwrap_or(UNKNOWN),
                pid.as_deref().unwrap_or(NO_PID),
                b.state,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Protocol;

    fn sshd() -> PortBinding {
        PortBinding {
            protocol: Protocol::Tcp,
            port: 22,
            service_name: Some("ssh".to_string()),
            process_name: Some("sshd".to_string()),
            pid: Some(450),
            state: "LISTEN".to_string(),
            local_address: Some("0.0.0.0".to_string()),
        }
    }

    #[test]
    fn test_nothing_listening() {
        assert_eq!(
            describe_port(8080, &[sshd()]),
            "No process is currently listening on port 8080."
        );
        assert_eq!(
            describe_port(0, &[]),
            "No process is currently listening on port 0."
        );
    }

    #[test]
    fn test_one_line_per_binding() {
        let anonymous = PortBinding {
            protocol: Protocol::Udp,
            port: 22,
            service_name: None,
            process_name: None,
            pid: None,
            state: "UNCONN".to_string(),
            local_address: None,
        };

        let text = describe_port(22, &[sshd(), anonymous]);

        assert_eq!(
            text,
            "tcp port 22 (ssh): process sshd (pid 450), state LISTEN\n\
             udp port 22 (unknown): process unknown (pid ?), state UNCONN"
        );
    }
}
