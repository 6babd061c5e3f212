//! `parkwatch` – Parking Availability Command Line Interface
//!
//! One binary for every role in the system:
//!
//! - `serve`    – run the occupancy server (API + browser dashboard).
//! - `watch`    – terminal dashboard, polling once per second or streaming.
//! - `report`   – send a single report, exactly like the sensor device does.
//! - `simulate` – emulate the sensor device for a lot of a given capacity.
//! - `config`   – show or initialise `~/.parkwatch/config.toml`.

mod config;
mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use parkwatch_dashboard::{DashboardPoller, PollerConfig, StreamWatcher, TerminalView};
use parkwatch_sensor::{LotSimulator, SensorClient};
use parkwatch_server::ParkServer;
use parkwatch_store::StateStore;

#[derive(Debug, Parser)]
#[command(name = "parkwatch", version, about = "Parking-space availability server and dashboards")]
struct Cli {
    /// Config file (defaults to ~/.parkwatch/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the occupancy server.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show live occupancy in the terminal.
    Watch {
        /// Server base URL.
        #[arg(long)]
        url: Option<String>,
        /// Poll interval; must be at least 1 ms.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,
        /// Use the WebSocket push stream instead of polling.
        #[arg(long)]
        stream: bool,
        /// Spaces that fill the bar chart.
        #[arg(long)]
        capacity: Option<u32>,
    },
    /// Send one occupancy report.
    Report {
        /// Movement label, e.g. "entrada" or "salida".
        movement: String,
        /// Free spaces after the movement.
        spaces: u32,
        #[arg(long)]
        url: Option<String>,
    },
    /// Emulate the sensor device.
    Simulate {
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        capacity: Option<u32>,
        #[arg(long, default_value_t = 2000, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: u64,
        /// Stop after this many reports (runs until Ctrl-C otherwise).
        #[arg(long)]
        steps: Option<u64>,
        /// Seed for a reproducible sequence.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the effective configuration.
    Config {
        /// Write the defaults to the config file if it does not exist yet.
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = telemetry::init_tracing("parkwatch");

    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let cfg = config::load_or_default(&config_path)?;

    match cli.command {
        Command::Serve { host, port } => {
            let store = Arc::new(StateStore::new());
            let server = ParkServer::new(store)
                .with_host(host.unwrap_or(cfg.host.clone()))
                .with_port(port.unwrap_or(cfg.port))
                .with_request_timeout(cfg.server_timeout());
            print_banner(&format!("http://{}", server.bind_addr()));
            server.run().await?;
        }

        Command::Watch {
            url,
            interval_ms,
            stream,
            capacity,
        } => {
            let url = url.unwrap_or(cfg.server_url.clone());
            let mut view = TerminalView::new(capacity.unwrap_or(cfg.lot_capacity));
            let interval = interval_ms.map(Duration::from_millis).unwrap_or(cfg.poll_interval());
            print_banner(&url);

            if stream {
                StreamWatcher::new(&url, interval)
                    .run_until(&mut view, ctrl_c())
                    .await;
            } else {
                let poller_config = PollerConfig {
                    interval,
                    request_timeout: cfg.request_timeout(),
                };
                DashboardPoller::new(&url, poller_config)?
                    .run_until(&mut view, ctrl_c())
                    .await;
            }
        }

        Command::Report {
            movement,
            spaces,
            url,
        } => {
            let url = url.unwrap_or(cfg.server_url.clone());
            let client = SensorClient::new(&url, cfg.request_timeout())?;
            client
                .report(&movement, spaces)
                .await
                .with_context(|| format!("report to {} failed", client.ingest_url()))?;
            println!("{} {} ({} libres)", "✓".green().bold(), movement.bold(), spaces);
        }

        Command::Simulate {
            url,
            capacity,
            interval_ms,
            steps,
            seed,
        } => {
            let url = url.unwrap_or(cfg.server_url.clone());
            let capacity = capacity.unwrap_or(cfg.lot_capacity);
            let client = SensorClient::new(&url, cfg.request_timeout())?;
            let mut sim = match seed {
                Some(seed) => LotSimulator::seeded(capacity, seed),
                None => LotSimulator::new(capacity),
            };
            info!(url = %url, capacity, interval_ms, "sensor simulation started");

            let interval = Duration::from_millis(interval_ms);
            tokio::select! {
                accepted = sim.drive(&client, interval, steps) => {
                    let accepted = accepted?;
                    info!(accepted, "sensor simulation finished");
                }
                _ = ctrl_c() => info!("sensor simulation interrupted"),
            }
        }

        Command::Config { init } => {
            if init && !config_path.exists() {
                config::save_to(&cfg, &config_path)?;
                println!(
                    "{} Config saved to {}",
                    "✓".green().bold(),
                    config_path.display().to_string().bold()
                );
            }
            println!("{}", config_path.display().to_string().dimmed());
            println!("{cfg:#?}");
        }
    }

    Ok(())
}

async fn ctrl_c() {
    let _ = tokio::signal::ctrl_c().await;
}

fn print_banner(target: &str) {
    println!();
    println!(
        "  {} {}  {}",
        "parkwatch".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed(),
        target.bold()
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn report_takes_movement_and_spaces() {
        let cli = Cli::try_parse_from(["parkwatch", "report", "entrada", "0"]).unwrap();
        match cli.command {
            Command::Report { movement, spaces, url } => {
                assert_eq!(movement, "entrada");
                assert_eq!(spaces, 0);
                assert!(url.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn report_rejects_negative_spaces() {
        assert!(Cli::try_parse_from(["parkwatch", "report", "salida", "-1"]).is_err());
    }

    #[test]
    fn zero_intervals_are_rejected() {
        assert!(Cli::try_parse_from(["parkwatch", "watch", "--interval-ms", "0"]).is_err());
        assert!(Cli::try_parse_from(["parkwatch", "simulate", "--interval-ms", "0"]).is_err());

        let cli = Cli::try_parse_from(["parkwatch", "watch", "--interval-ms", "1"]).unwrap();
        assert!(matches!(cli.command, Command::Watch { interval_ms: Some(1), .. }));
    }

    #[test]
    fn serve_accepts_port_override() {
        let cli = Cli::try_parse_from(["parkwatch", "serve", "--port", "8080"]).unwrap();
        assert!(matches!(cli.command, Command::Serve { port: Some(8080), .. }));
    }
}
