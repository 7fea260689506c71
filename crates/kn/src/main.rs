//! kn CLI - Presentation and documentation server.
//!
//! Serves decks, books and bundles from a content directory, or exports
//! them as a static site with `--generate`.

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::Parser;
use kn_config::{CliSettings, Config};
use tracing_subscriber::EnvFilter;

use error::CliError;
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// kn - Presentation and documentation server.
#[derive(Parser, Debug)]
#[command(name = "kn", version, about)]
struct Cli {
    /// Host to bind to (overrides config).
    #[arg(short = 'H', long, env = "KN_HOST")]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long, env = "KN_PORT")]
    port: Option<u16>,

    /// Content source directory (overrides config).
    #[arg(short = 'd', long)]
    source_dir: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover site.yaml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Static export output directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// URL path the static export is served under (overrides config).
    #[arg(short, long)]
    base_path: Option<String>,

    /// Generate a static site instead of serving.
    #[arg(short = 'g', long)]
    generate: bool,

    /// Load content once and never refresh it.
    #[arg(long)]
    frozen: bool,

    /// Enable verbose output (refresh and request logs).
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Config overrides given on the command line.
    fn settings(&self) -> CliSettings {
        CliSettings {
            host: self.host.clone(),
            port: self.port,
            source_dir: self.source_dir.clone(),
            frozen: self.frozen.then_some(true),
            output_dir: self.output_dir.clone(),
            base_path: self.base_path.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&cli) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref(), Some(&cli.settings()))?;

    if cli.generate {
        return commands::export::execute(&config);
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(commands::serve::execute(&config, VERSION))
}
