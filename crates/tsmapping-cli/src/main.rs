//! tsmapping CLI: create an index from a definition file, then run bulk
//! bodies or search bodies against it.

mod commands;

use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::ExitCode};
use tracing_subscriber::EnvFilter;
use tsmapping::config::Config;

///
/// Cli
///

#[derive(Parser)]
#[command(name = "tsmapping")]
#[command(about = "Validate time-series index mappings and documents")]
#[command(version)]
struct Cli {
    /// TOML config file
    #[arg(short, long, env = "TSMAPPING_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

///
/// Commands
///

#[derive(Subcommand)]
enum Commands {
    /// Create an index and print its settings and mapping
    Create(commands::IndexArgs),

    /// Create an index, then run a newline-delimited bulk body against it
    Bulk {
        #[command(flatten)]
        index: commands::IndexArgs,

        /// Bulk body file, or - for stdin
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Create an index, then check a search body against it
    Search {
        #[command(flatten)]
        index: commands::IndexArgs,

        /// Search body file, or - for stdin
        #[arg(short, long)]
        body: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.config.as_deref().map(Config::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let level = cli.log_level.as_deref().unwrap_or(&config.log.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Create(index) => commands::create(config, &index),
        Commands::Bulk { index, file } => commands::bulk(config, &index, &file),
        Commands::Search { index, body } => commands::search(config, &index, &body),
    };

    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{}", err.to_json());
            ExitCode::FAILURE
        }
    }
}
