use anyhow::Result;

use crate::types::PortBinding;

pub fn print_bindings(bindings: &[PortBinding]) -> Result<()> {
    let json = serde_json::to_string_pretty(bindings)?;
    println!("{json}");
    Ok(())
}
