use colored::Colorize;
use comfy_table::{Cell, Color, Table};

use crate::types::{PortBinding, Protocol};

pub fn print_bindings(bindings: &[PortBinding], source: Option<&str>) {
    if bindings.is_empty() {
        println!("{}", "No listening ports found".yellow());
        return;
    }

    let has_service = bindings.iter().any(|b| b.service_name.is_some());

    let mut table = Table::new();

    let mut headers = vec!["PORT", "PROTO", "PID", "PROCESS"];
    if has_service {
        headers.push("SERVICE");
    }
    headers.push("STATE");
    headers.push("ADDRESS");
    table.set_header(headers);

    for binding in bindings {
        let proto_color = match binding.protocol {
            Protocol::Tcp => Color::Cyan,
            Protocol::Udp => Color::Magenta,
        };

        let pid = binding
            .pid
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());

        let mut row = vec![
            Cell::new(binding.port).fg(Color::Cyan),
            Cell::new(binding.protocol).fg(proto_color),
            Cell::new(pid),
            Cell::new(binding.process_name.as_deref().unwrap_or("-")),
        ];

        if has_service {
            row.push(Cell::new(binding.service_name.as_deref().unwrap_or("-")));
        }

        let state_color = if binding.state == "LISTEN" {
            Color::Green
        } else {
            Color::Reset
        };
        row.push(Cell::new(&binding.state).fg(state_color));
        row.push(Cell::new(binding.local_address.as_deref().unwrap_or("-")));

        table.add_row(row);
    }

    println!("{table}");

    let count_str = bindings.len().to_string();
    match source {
        Some(source) => println!("\n{} result(s) via {}", count_str.green(), source.dimmed()),
        None => println!("\n{} result(s)", count_str.green()),
    }
}
