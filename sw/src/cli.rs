//! CLI command definitions and subcommands

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::events::ConsoleFormat;

/// Santa Workshop - Santa Claus problem simulator
#[derive(Parser)]
#[command(
    name = "sw",
    about = "Simulate Santa, nine reindeer and a pool of elves rendezvousing on semaphores",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/santa-workshop/logs/sw.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run the simulation until the delivery goal is reached
    Run {
        /// Number of elves (minimum 3)
        #[arg(short, long)]
        elves: Option<usize>,

        /// Deliveries to complete before stopping
        #[arg(short, long)]
        deliveries: Option<u32>,

        /// Speed multiplier; delays are divided by it
        #[arg(short, long)]
        speed: Option<f64>,

        /// Activity log format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Milliseconds to wait for tasks to stop after shutdown
        #[arg(long)]
        grace_ms: Option<u64>,
    },

    /// Print the effective configuration as YAML
    Config,
}

/// Output format for the activity log and summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<OutputFormat> for ConsoleFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ConsoleFormat::Text,
            OutputFormat::Json => ConsoleFormat::Json,
        }
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("santa-workshop")
        .join("logs")
        .join("sw.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::parse_from(["sw", "-v", "run", "--elves", "5", "--deliveries", "2", "--speed", "4", "-f", "json"]);
        assert!(cli.verbose);
        match cli.command {
            Some(Command::Run {
                elves,
                deliveries,
                speed,
                format,
                grace_ms,
            }) => {
                assert_eq!(elves, Some(5));
                assert_eq!(deliveries, Some(2));
                assert_eq!(speed, Some(4.0));
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(grace_ms, None);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_log_path_ends_with_file_name() {
        assert!(get_log_path().ends_with("santa-workshop/logs/sw.log"));
    }
}
