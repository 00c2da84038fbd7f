use anyhow::Result;

use crate::config::DiscoveryConfig;
use crate::output::{json, table};

pub fn execute(config: &DiscoveryConfig, output_json: bool) -> Result<()> {
    let discovery = crate::discover_report(config);

    if output_json {
        json::print_bindings(&discovery.bindings)?;
    } else {
        table::print_bindings(&discovery.bindings, discovery.source);
    }

    Ok(())
}
