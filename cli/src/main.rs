//! httptap CLI: driving adapter for the tap core.
//!
//! Subcommands:
//! - `check <config>`: validate a tap config and list its rules
//! - `replay <config> <exchanges> [--format yaml|json]`: run recorded
//!   exchanges through the tap and print every trace it would stream

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use httptap::{TapConfig, TapConfigSpec, Trace};
use httptap_test::{Exchange, RecordingSink};
use serde::de::DeserializeOwned;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "httptap", version)]
#[command(about = "Check tap configs and replay exchanges through them", long_about = None)]
struct Cli {
    /// More logging (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a tap config
    Check {
        /// YAML or JSON tap config
        config: String,
    },
    /// Replay exchanges through a tap config and print the traces
    Replay {
        /// YAML or JSON tap config
        config: String,
        /// YAML or JSON list of exchanges
        exchanges: String,
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Command::Check { config } => cmd_check(config),
        Command::Replay {
            config,
            exchanges,
            format,
        } => cmd_replay(config, exchanges, *format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "httptap=debug",
        _ => "httptap=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_check(path: &str) -> Result<()> {
    let config = build(load(path)?).with_context(|| format!("config \"{path}\" invalid"))?;

    println!("Config valid: {} rule(s)", config.rules().len());
    for rule in config.rules() {
        println!(
            "  {} (request: {}, response: {})",
            rule.id(),
            rule.request_headers().len(),
            rule.response_headers().len()
        );
    }
    Ok(())
}

fn cmd_replay(config_path: &str, exchanges_path: &str, format: Format) -> Result<()> {
    let spec: TapConfigSpec = load(config_path)?;
    let exchanges: Vec<Exchange> = load(exchanges_path)?;

    let replay = replay(spec, &exchanges)?;
    for trace in &replay.traces {
        print!("{}", render(trace, format)?);
    }
    eprintln!("tapped {}/{} exchange(s)", replay.tapped, replay.total);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Replay
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct Replay {
    traces: Vec<Trace>,
    tapped: usize,
    total: usize,
}

fn build(spec: TapConfigSpec) -> Result<std::sync::Arc<TapConfig>> {
    // A real proxy hands traces to an admin stream; here they are collected.
    Ok(TapConfig::new(spec, RecordingSink::new())?)
}

fn replay(spec: TapConfigSpec, exchanges: &[Exchange]) -> Result<Replay> {
    let sink = RecordingSink::new();
    let config = TapConfig::new(spec, sink.clone()).context("config invalid")?;

    let tapped = exchanges.iter().filter(|e| e.run(&config)).count();
    tracing::debug!(tapped, total = exchanges.len(), "replay finished");

    Ok(Replay {
        traces: sink.take(),
        tapped,
        total: exchanges.len(),
    })
}

fn render(trace: &Trace, format: Format) -> Result<String> {
    Ok(match format {
        Format::Yaml => format!("---\n{}", serde_yaml::to_string(trace)?),
        Format::Json => format!("{}\n", serde_json::to_string(trace)?),
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// File loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load<T: DeserializeOwned>(path: &str) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read \"{path}\""))?;
    parse(path, &content)
}

fn parse<T: DeserializeOwned>(path: &str, content: &str) -> Result<T> {
    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(content).with_context(|| format!("JSON parse error in \"{path}\""))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(content).with_context(|| format!("YAML parse error in \"{path}\""))
    }
}
