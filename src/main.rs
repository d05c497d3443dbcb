mod app;
mod commands;

use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use schema_forge::Config;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Schema Forge - build a field tree and generate its JSON Schema
#[derive(Parser, Debug)]
#[command(name = "schema-forge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to ~/.config/schema-forge/config.toml)
    #[arg(short, long, env = "SCHEMA_FORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Run editor commands from a file instead of stdin
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Default destination for `export`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print schemas on a single line
    #[arg(long)]
    compact: bool,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = match args.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Apply CLI overrides
    if let Some(output) = args.output {
        config.output.export_path = Some(output);
    }
    if args.compact {
        config.output.pretty = false;
    }
    if let Some(log_file) = args.log_file {
        config.general.log_file = log_file;
    }

    // Set up file-based logging
    let log_file = File::create(&config.general.log_file).with_context(|| {
        format!("Failed to create log file: {}", config.general.log_file.display())
    })?;
    tracing_subscriber::registry()
        .with(EnvFilter::new(&config.general.log_filter))
        .with(fmt::layer().with_writer(log_file).with_ansi(false))
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting schema-forge");

    let mut app = app::App::new(config);
    let mut stdout = io::stdout().lock();

    match args.script {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open script: {}", path.display()))?;
            app.run(BufReader::new(file), &mut stdout, false)
        }
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            app.run(stdin.lock(), &mut stdout, interactive)
        }
    }
}
