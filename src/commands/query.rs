use anyhow::Result;

use crate::config::DiscoveryConfig;
use crate::output::{json, table};
use crate::types::PortBinding;

pub fn execute(config: &DiscoveryConfig, port: u16, output_json: bool) -> Result<()> {
    let discovery = crate::discover_report(config);

    let matching: Vec<PortBinding> = PortBinding::filter_port(&discovery.bindings, port)
        .into_iter()
        .cloned()
        .collect();

    if output_json {
        json::print_bindings(&matching)?;
    } else {
        table::print_bindings(&matching, discovery.source);
    }

    Ok(())
}
