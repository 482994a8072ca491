//! btmd - Bluetooth Manager Daemon
//!
//! Registers the configured transports with a manager, reports what they
//! discovered (per transport and through the combined adapter), and
//! unregisters them on shutdown.
//!
//! Usage:
//!   btmd [OPTIONS] [config.toml]
//!
//! If no config file is provided, two in-memory demo transports are used.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use btm_core::DiscoveredObject;
use btm_manager::BluetoothManager;
use btm_mock::MockTransportFactory;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::DaemonConfig;

/// Parsed command-line arguments
struct Args {
    /// Daemon config file (TOML)
    config_path: Option<PathBuf>,
    /// Print the discovery report as JSON
    json: bool,
    /// Exit after the first report instead of waiting for Ctrl-C
    once: bool,
}

fn parse_args() -> Args {
    let mut result = Args {
        config_path: None,
        json: false,
        once: false,
    };

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => result.json = true,
            "--once" => result.once = true,
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                // Positional argument = config file
                result.config_path = Some(PathBuf::from(arg));
            }
            _ => {
                tracing::warn!("Unknown argument: {}", arg);
            }
        }
    }

    result
}

fn print_help() {
    eprintln!(
        r#"btmd - Bluetooth Manager Daemon

Usage: btmd [OPTIONS] [config.toml]

Options:
      --json    Print the discovery report as JSON
      --once    Exit after printing the report
  -h, --help    Print this help message

Examples:
  # Run with the built-in demo transports
  btmd --once

  # Run with config file
  btmd config.toml
"#
    );
}

/// Discovery report printed at startup
#[derive(Debug, Serialize)]
struct DiscoveryReport {
    protocols: Vec<String>,
    adapters: Vec<ReportEntry>,
    devices: Vec<ReportEntry>,
    combined_devices: Vec<ReportEntry>,
}

#[derive(Debug, Serialize)]
struct ReportEntry {
    url: String,
    display_name: String,
}

impl ReportEntry {
    fn from_object(object: &impl DiscoveredObject) -> Self {
        Self {
            url: object.url().to_string(),
            display_name: object.display_name().to_string(),
        }
    }
}

fn build_report(manager: &BluetoothManager) -> DiscoveryReport {
    DiscoveryReport {
        protocols: manager.registry().protocols(),
        adapters: manager
            .discovered_adapters()
            .iter()
            .map(ReportEntry::from_object)
            .collect(),
        devices: manager
            .discovered_devices()
            .iter()
            .map(ReportEntry::from_object)
            .collect(),
        combined_devices: manager
            .combined_discovered_devices()
            .iter()
            .map(ReportEntry::from_object)
            .collect(),
    }
}

fn print_report(report: &DiscoveryReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Transports: {}", report.protocols.join(", "));
    for (title, entries) in [
        ("Adapters", &report.adapters),
        ("Devices", &report.devices),
        ("Combined devices", &report.combined_devices),
    ] {
        println!("{} ({}):", title, entries.len());
        for entry in entries {
            println!("  {:<48} {}", entry.url, entry.display_name);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "btmd=info,btm_manager=info,btm_mock=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting btmd (Bluetooth Manager Daemon)");

    let args = parse_args();
    let config = match &args.config_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading config");
            DaemonConfig::load_from(path)?
        }
        None => {
            tracing::info!("No config file given, using demo transports");
            DaemonConfig::demo()
        }
    };

    let manager = Arc::new(BluetoothManager::new(config.manager.clone()));
    let worker = manager.spawn_invalidation_worker();

    let transports = config
        .transports
        .iter()
        .map(|transport| {
            MockTransportFactory::from_config(transport)
                .map(Arc::new)
                .with_context(|| format!("Invalid transport config: {}", transport.protocol))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    for transport in &transports {
        manager.register_factory(transport.clone());
    }

    print_report(&build_report(&manager), args.json)?;

    if !args.once {
        tracing::info!("Running, press Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;
    }

    tracing::info!("Shutting down, unregistering transports");
    for transport in &transports {
        manager.unregister_factory(transport.as_ref());
    }

    // Dropping the manager closes the invalidation queue and stops the worker.
    drop(manager);
    if let Some(worker) = worker {
        worker.await?;
    }

    tracing::info!("btmd stopped");
    Ok(())
}
