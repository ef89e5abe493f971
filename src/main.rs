use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use touchboard::Config;
use touchboard::runtime::{self, load_trace};

#[derive(Parser, Debug)]
#[command(name = "touchboard")]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TOUCHBOARD_GIT_HASH"), ")"),
    about = "Touch and pen input engine for a shared zoomable drawing canvas"
)]
struct Cli {
    /// Print the effective configuration as TOML and exit
    #[arg(long, action = ArgAction::SetTrue)]
    print_config: bool,

    /// Write the documented default config file and exit
    #[arg(long, action = ArgAction::SetTrue)]
    init_config: bool,

    /// Use this config file instead of ~/.config/touchboard/config.toml
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a recorded input trace and report what the engine produced
    Replay {
        /// Trace file (JSON)
        trace: PathBuf,

        /// Print the full report as JSON
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if cli.init_config {
        let path = match &cli.config {
            Some(path) => path.clone(),
            None => Config::get_config_path()?,
        };
        Config::create_default_file(&path)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    match cli.command {
        Some(Command::Replay { trace, json }) => {
            let loaded = load_trace(&trace)?;
            let report = runtime::replay(&loaded, &config)
                .with_context(|| format!("failed to replay {}", trace.display()))?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("failed to serialize report")?
                );
            } else {
                println!("{}", report.summary());
                for replayed in &report.events {
                    println!("  {:>6}ms  {}", replayed.at_ms, replayed.event.kind());
                }
            }
        }
        None => {
            println!("touchboard: touch and pen input engine for a shared drawing canvas");
            println!();
            println!("Usage:");
            println!("  touchboard replay <TRACE> [--json]   Replay a recorded input trace");
            println!("  touchboard --print-config            Show the effective configuration");
            println!("  touchboard --init-config             Write the default config file");
            println!("  touchboard --help                    Show help");
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
