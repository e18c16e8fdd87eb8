#![forbid(unsafe_code)]

mod apply;
mod auto_switch;
mod command;
mod commands;
mod config;
mod constants;
mod display;
mod shutdown;
mod signature;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level as TraceLevel, warn};
use tracing_subscriber::FmtSubscriber;

use command::SystemRunner;
use config::{Backend, ProfileStore, Settings};

#[derive(Parser)]
#[command(
    name = "screen-profiles",
    version,
    about = "Save display layouts and restore them when monitors change"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved profiles (* marks the one matching current displays)
    List,
    /// Save the current layout under a name
    Save {
        name: String,
        /// Backend to capture the layout with
        #[arg(long, value_enum, default_value_t = BackendChoice::Xrandr)]
        backend: BackendChoice,
    },
    /// Apply a saved profile
    Apply { name: String },
    /// Delete a saved profile
    Delete { name: String },
    /// Show a saved profile
    Show { name: String },
    /// Show connected displays and their signature
    Detect,
    /// Apply the profile matching the connected displays
    Auto {
        /// Keep watching and re-apply whenever displays change
        #[arg(long)]
        daemon: bool,
    },
    /// Write the default settings file
    Init,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendChoice {
    Xrandr,
    Kscreen,
}

impl From<BackendChoice> for Backend {
    fn from(choice: BackendChoice) -> Self {
        match choice {
            BackendChoice::Xrandr => Backend::Xrandr,
            BackendChoice::Kscreen => Backend::KScreen,
        }
    }
}

fn log_level(settings: &Settings) -> TraceLevel {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.log_level.clone());
    match level.to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (settings, problems) = Settings::read();

    // Logs go to stderr; stdout carries command output
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&settings))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    for problem in &problems {
        warn!(path = %Settings::path().display(), "{}", problem);
    }

    let runner = SystemRunner;

    match cli.command {
        Commands::Init => commands::init(&Settings::path()),
        Commands::Detect => commands::detect(&runner, &settings, &ProfileStore::load()),
        Commands::List => commands::list(&runner, &settings, &ProfileStore::load()),
        Commands::Show { name } => commands::show(&ProfileStore::load(), &name),
        Commands::Save { name, backend } => {
            let mut store = ProfileStore::load();
            commands::save(&runner, &settings, &mut store, &name, backend.into())
        }
        Commands::Apply { name } => {
            commands::apply(&runner, &settings, &ProfileStore::load(), &name)
        }
        Commands::Delete { name } => commands::delete(&mut ProfileStore::load(), &name),
        Commands::Auto { daemon } => {
            commands::auto(&runner, &settings, &ProfileStore::load(), daemon)
        }
    }
}
