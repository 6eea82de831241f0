//! memento - a lifespan countdown appliance.
//!
//! Drives the menu state machine from a terminal: button presses are
//! simulated as raw sample timelines pushed through the debouncer, pages
//! render as text, and the settings record persists to disk.

use clap::Parser;
use memento_app::{App, Config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod repl;

#[derive(Debug, Parser)]
#[command(name = "memento", version, about = "Lifespan countdown appliance simulator")]
struct Args {
    /// Path to a YAML config file (takes precedence over MEMENTO_CONFIG).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data directory for the settings record.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Run commands from a script file instead of the interactive prompt.
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let config = Config::from_file(path)?;
            tracing::info!("Loaded config from {}", path.display());
            config
        }
        None => Config::load()?,
    };

    if let Some(dir) = args.data_dir {
        config.storage.data_dir = dir;
    }

    tracing::info!("Starting memento");
    tracing::info!("  Data directory: {}", config.storage.data_dir.display());
    tracing::info!(
        "  Buttons: debounce {}ms, long press {}ms",
        config.input.debounce_ms,
        config.input.long_press_ms
    );

    let app = App::new(&config, std::io::stdout())?;

    match args.script {
        Some(path) => repl::run_script(app, &config, &path),
        None => repl::run(app, &config),
    }
}
