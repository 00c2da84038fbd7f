pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod platform;
pub mod services;
pub mod types;

pub use cli::Cli;
pub use config::DiscoveryConfig;
pub use error::Error;
pub use platform::{CommandRunner, Discovery, SystemRunner};
pub use types::{PortBinding, Protocol};

use std::io;

use anyhow::Result;
use clap::CommandFactory;

use crate::output::summary;
use crate::platform::{BindingSource, LsofSource, SsSource};
use crate::services::ServiceDatabase;

pub fn run(cli: Cli) -> Result<()> {
    let config = cli.discovery.to_config()?;

    match &cli.command {
        Some(cli::Commands::List) => commands::list::execute(&config, cli.json),
        Some(cli::Commands::Describe { port }) => {
            commands::describe::execute(&config, *port, cli.json)
        }
        Some(cli::Commands::Completions { shell }) => {
            clap_complete::generate(*shell, &mut Cli::command(), "bindscan", &mut io::stdout());
            Ok(())
        }
        None => match cli.port {
            Some(port) => commands::query::execute(&config, port, cli.json),
            None => commands::list::execute(&config, cli.json),
        },
    }
}

/// Listening sockets on this host, deduplicated and sorted by
/// (protocol, port). Missing tools and unreadable output only shrink the
/// result.
pub fn discover(config: &DiscoveryConfig) -> Vec<PortBinding> {
    discover_report(config).bindings
}

/// Like [`discover`], but also reports which tool produced the data.
pub fn discover_report(config: &DiscoveryConfig) -> Discovery {
    discover_with(config, &SystemRunner::new(config.timeout))
}

pub fn discover_with(config: &DiscoveryConfig, runner: &dyn CommandRunner) -> Discovery {
    let protocols = config.protocols();
    if protocols.is_empty() {
        return Discovery::default();
    }

    let services = ServiceDatabase::load(&config.services_file);
    let primary = SsSource::new(config.primary_tool.clone());
    let fallback = LsofSource::new(config.fallback_tool.clone());
    let sources: [&dyn BindingSource; 2] = [&primary, &fallback];

    platform::collect(&sources, &protocols, runner, &services)
}

/// Human-readable summary of the bindings on `port`.
///
/// # Errors
///
/// Returns [`Error::InvalidPort`] when `port` is outside 0-65535.
pub fn describe(config: &DiscoveryConfig, port: i64) -> error::Result<String> {
    describe_with(config, &SystemRunner::new(config.timeout), port)
}

pub fn describe_with(
    config: &DiscoveryConfig,
    runner: &dyn CommandRunner,
    port: i64,
) -> error::Result<String> {
    let port = u16::try_from(port).map_err(|_| Error::InvalidPort(port))?;
    let discovery = discover_with(config, runner);
    Ok(summary::describe_port(port, &discovery.bindings))
}
