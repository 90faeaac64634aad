//! emberctl - command-line access to the job builder
//!
//! Wraps the builder's simple commands: defaults, timezone and license
//! listings, and job administration.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use common::{init_logging, ClientConfig};
use ember_comlink::{BuilderClient, JobListKind};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "emberctl")]
#[command(about = "emberctl - job builder command-line client")]
#[command(long_about = "emberctl - job builder command-line client

Builder information:
  defaults    Show the option values the builder recommends
  timezones   List the timezones the builder knows
  licenses    List third-party licenses

Job administration:
  archive     Pack a job's files as tar (default) or zip
  delete      Delete a job
  stop        Stop a running job
  jobs        List complete, running or queued jobs

Examples:
  emberctl --host builder.local timezones
  emberctl archive job_20240601 --zip
  emberctl stop job_20240601 --priority 2
  emberctl jobs running

Use 'emberctl <command> --help' for more information on a specific command.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (toml, yaml or json)
    #[arg(short = 'c', long = "config", global = true, env = "EMBER_CONFIG")]
    config: Option<PathBuf>,

    /// Builder host, overrides the configuration
    #[arg(long, global = true)]
    host: Option<String>,

    /// Builder port, overrides the configuration
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the builder's recommended option values
    Defaults,

    /// List the timezones the builder knows
    Timezones {
        /// Print as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// List the builder's third-party licenses
    Licenses {
        /// Print as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Ask the builder to archive a job's files
    Archive {
        /// Job name
        job: String,
        /// Zip instead of tar
        #[arg(long)]
        zip: bool,
    },

    /// Delete a job
    Delete {
        /// Job name
        job: String,
    },

    /// Stop a running job
    Stop {
        /// Job name
        job: String,
        /// Stop priority
        #[arg(long, default_value = "0")]
        priority: u16,
    },

    /// List jobs in one of the builder's queues
    Jobs {
        #[arg(value_enum)]
        kind: ListKind,
    },

    /// Print the effective configuration as YAML
    Config,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ListKind {
    Complete,
    Running,
    Queued,
}

impl From<ListKind> for JobListKind {
    fn from(kind: ListKind) -> Self {
        match kind {
            ListKind::Complete => JobListKind::Complete,
            ListKind::Running => JobListKind::Running,
            ListKind::Queued => JobListKind::Queued,
        }
    }
}

/// Configuration file plus environment, then command-line overrides
fn effective_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(cli.config.as_deref()).with_context(|| {
        match cli.config.as_deref() {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Failed to load configuration".to_string(),
        }
    })?;

    if let Some(host) = cli.host.as_deref() {
        config.builder.host = host.to_string();
    }
    if let Some(port) = cli.port {
        config.builder.port = port;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if cli.no_color {
        config.logging.ansi = false;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = effective_config(&cli)?;
    init_logging(&config.logging)?;
    debug!("Builder endpoint: {}", config.builder.address());

    if let Commands::Config = cli.command {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let client = BuilderClient::connect_to(&config.builder)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("Invalid builder endpoint {}", config.builder.address()))?;

    let result = match cli.command {
        Commands::Defaults => commands::show_defaults(&client).await,
        Commands::Timezones { yaml } => commands::list_timezones(&client, yaml).await,
        Commands::Licenses { yaml } => commands::list_licenses(&client, yaml).await,
        Commands::Archive { job, zip } => commands::archive(&client, &job, zip).await,
        Commands::Delete { job } => commands::delete(&client, &job).await,
        Commands::Stop { job, priority } => commands::stop(&client, &job, priority).await,
        Commands::Jobs { kind } => commands::list_jobs(&client, kind.into()).await,
        Commands::Config => Ok(()),
    };

    if let Err(e) = &result {
        eprintln!("{} {}", "Error:".red().bold(), e);
    }
    result
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_global_overrides() {
        let cli = Cli::try_parse_from([
            "emberctl", "stop", "job_1", "--priority", "3", "--host", "builder", "-p", "4000",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Stop { ref job, priority: 3 } if job == "job_1"
        ));
        assert_eq!(cli.host.as_deref(), Some("builder"));
        assert_eq!(cli.port, Some(4000));
    }

    #[test]
    fn test_jobs_kind_values() {
        let cli = Cli::try_parse_from(["emberctl", "jobs", "queued"]).unwrap();
        assert!(matches!(cli.command, Commands::Jobs { kind: ListKind::Queued }));
        assert_eq!(JobListKind::from(ListKind::Queued), JobListKind::Queued);
        assert!(Cli::try_parse_from(["emberctl", "jobs", "paused"]).is_err());
    }

    #[test]
    fn test_command_line_overrides_config() {
        let cli = Cli::try_parse_from([
            "emberctl", "--host", "10.0.0.5", "--port", "5000", "-v", "config",
        ])
        .unwrap();
        let config = effective_config(&cli).unwrap();
        assert_eq!(config.builder.address(), "10.0.0.5:5000");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_zero_port_rejected() {
        let cli = Cli::try_parse_from(["emberctl", "--port", "0", "config"]).unwrap();
        assert!(effective_config(&cli).is_err());
    }
}
