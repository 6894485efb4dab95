//! Santa Workshop - Santa Claus problem simulator
//!
//! CLI entry point: runs a headless workshop and streams its activity log.

use std::fs;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use eyre::{Context, Result};
use tracing::{info, warn};

use santa_workshop::Workshop;
use santa_workshop::cli::{Cli, Command, OutputFormat, get_log_path};
use santa_workshop::config::Config;
use santa_workshop::events::ConsoleSink;
use santa_workshop::simulation::{Simulation, Summary};

fn setup_logging(verbose: bool) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Write to the log file so stdout stays reserved for the activity log
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    match cli.command {
        Some(Command::Run {
            elves,
            deliveries,
            speed,
            format,
            grace_ms,
        }) => {
            let mut config = config;
            if let Some(elves) = elves {
                config.workshop.elves = elves;
            }
            if let Some(deliveries) = deliveries {
                config.workshop.required_deliveries = deliveries;
            }
            if let Some(speed) = speed {
                config.workshop.speed = speed;
            }
            if let Some(grace_ms) = grace_ms {
                config.shutdown.grace_ms = grace_ms;
            }
            cmd_run(config, format).await
        }
        Some(Command::Config) => cmd_config(&config),
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Run the simulation to its goal, or until Ctrl-C
async fn cmd_run(config: Config, format: OutputFormat) -> Result<()> {
    let workshop_config = config.workshop.normalized();
    let grace = Duration::from_millis(config.shutdown.grace_ms);
    info!(?workshop_config, "cmd_run: starting");

    let workshop = Workshop::new(workshop_config.clone());
    let sink = workshop.attach_sink(ConsoleSink::new(format.into()));
    let sim = Simulation::start_with(workshop, workshop_config.elves);

    tokio::select! {
        _ = sim.wait_for_goal() => {}
        res = tokio::signal::ctrl_c() => {
            res.context("Failed to listen for Ctrl-C")?;
            warn!("Interrupted, shutting down");
        }
    }

    let summary = sim.shutdown(grace).await.context("Workshop did not shut down cleanly")?;

    // Every sender is gone now; let the sink flush what is buffered.
    if tokio::time::timeout(Duration::from_secs(1), sink).await.is_err() {
        warn!("Activity sink did not drain in time");
    }

    print_summary(&summary, format)
}

fn print_summary(summary: &Summary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(summary).context("Failed to serialize summary")?);
        }
        OutputFormat::Text => {
            println!();
            println!("Deliveries: {}", summary.deliveries);
            println!("Elf helps:  {}", summary.helps);
            println!("Elapsed:    {:.2}s", summary.elapsed_ms as f64 / 1000.0);
        }
    }
    Ok(())
}

/// Print the effective configuration
fn cmd_config(config: &Config) -> Result<()> {
    let effective = Config {
        workshop: config.workshop.clone().normalized(),
        shutdown: config.shutdown.clone(),
    };
    let yaml = serde_yaml::to_string(&effective).context("Failed to serialize config")?;
    print!("{}", yaml);
    Ok(())
}
