use anyhow::Result;

use crate::config::DiscoveryConfig;

pub fn execute(config: &DiscoveryConfig, port: i64, output_json: bool) -> Result<()> {
    let summary = crate::describe(config, port)?;

    if output_json {
        let output = serde_json::json!({
            "port": port,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{summary}");
    }

    Ok(())
}
