use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::config::{self, DiscoveryConfig};

#[derive(Parser)]
#[command(name = "bindscan")]
#[command(version, about = "Show which processes are listening on which local ports")]
pub struct Cli {
    /// Port number to show
    pub port: Option<u16>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub discovery: DiscoveryArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Clone)]
pub struct DiscoveryArgs {
    /// Only TCP sockets
    #[arg(short, long, global = true)]
    pub tcp: bool,

    /// Only UDP sockets
    #[arg(short, long, global = true)]
    pub udp: bool,

    /// Path to the ss binary
    #[arg(long, global = true, default_value = config::DEFAULT_PRIMARY)]
    pub ss_path: PathBuf,

    /// Path to the lsof binary
    #[arg(long, global = true, default_value = config::DEFAULT_FALLBACK)]
    pub lsof_path: PathBuf,

    /// Services database used to name ports
    #[arg(long, global = true, default_value = config::DEFAULT_SERVICES)]
    pub services_file: PathBuf,

    /// Seconds to wait for each external tool (default: 5)
    #[arg(long, global = true, default_value = "5")]
    pub timeout: f64,
}

impl DiscoveryArgs {
    pub fn to_config(&self) -> anyhow::Result<DiscoveryConfig> {
        let timeout = Duration::try_from_secs_f64(self.timeout)
            .map_err(|_| anyhow::anyhow!("Invalid timeout: {}", self.timeout))?;

        // Neither flag means both protocols.
        let both = !self.tcp && !self.udp;

        Ok(DiscoveryConfig {
            include_tcp: both || self.tcp,
            include_udp: both || self.udp,
            primary_tool: self.ss_path.clone(),
            fallback_tool: self.lsof_path.clone(),
            services_file: self.services_file.clone(),
            timeout,
        })
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all listening ports
    List,
    /// Describe what is listening on a port
    Describe {
        /// Port number (0-65535)
        #[arg(allow_negative_numbers = true)]
        port: i64,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neither_protocol_flag_means_both() {
        let cli = Cli::parse_from(["bindscan"]);
        let config = cli.discovery.to_config().unwrap();

        assert!(config.include_tcp);
        assert!(config.include_udp);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_udp_only() {
        let cli = Cli::parse_from(["bindscan", "list", "--udp"]);
        let config = cli.discovery.to_config().unwrap();

        assert!(!config.include_tcp);
        assert!(config.include_udp);
    }

    #[test]
    fn test_tool_paths() {
        let cli = Cli::parse_from([
            "bindscan",
            "--ss-path",
            "/sbin/ss",
            "--lsof-path",
            "/usr/sbin/lsof",
            "--timeout",
            "0.5",
        ]);
        let config = cli.discovery.to_config().unwrap();

        assert_eq!(config.primary_tool, PathBuf::from("/sbin/ss"));
        assert_eq!(config.fallback_tool, PathBuf::from("/usr/sbin/lsof"));
        assert_eq!(config.timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_negative_timeout_rejected() {
        let cli = Cli::parse_from(["bindscan", "--timeout=-1"]);
        assert!(cli.discovery.to_config().is_err());
    }

    #[test]
    fn test_describe_accepts_out_of_range_port() {
        let cli = Cli::parse_from(["bindscan", "describe", "70000"]);
        assert!(matches!(cli.command, Some(Commands::Describe { port: 70000 })));
    }
}
