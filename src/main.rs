// src/main.rs - preheat-host: JSON-lines host adapter around the pre-heat engine
use clap::{Parser, Subcommand};
use preheat_rs::engine::PreheatEngine;
use preheat_rs::host::{ChannelCommandSink, HostEventQueue, SharedPreheatEngine, run_dispatcher};
use preheat_rs::scanner::FileSetpointScanner;
use preheat_rs::settings_store::TomlSettingsStore;
use preheat_shared::TriggerEvent;
use preheat_shared::config::PreheatSettings;
use preheat_shared::file_manager::LocalFileManager;
use std::path::PathBuf;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Pre-heat helper for 3D printer hosts
#[derive(Parser, Debug)]
#[command(name = "preheat-host", about = "Decides nozzle, bed and chamber pre-heat commands for a printer host.")]
struct Cli {
    /// Path to the TOML settings file (created with defaults if missing)
    #[arg(short, long, default_value = "preheat.toml")]
    settings: PathBuf,

    /// Directory local print files are resolved against
    #[arg(short, long, default_value = ".")]
    base_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read host events from stdin and write heater commands to stdout (default)
    Run,
    /// Print the setpoints found in a G-code file
    Scan { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    // Logs go to stderr; stdout carries the command stream
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("Loading settings from: {}", cli.settings.display());
    let store = TomlSettingsStore::open(&cli.settings).map_err(|e| {
        tracing::error!("Failed to load settings from '{}': {}", cli.settings.display(), e);
        Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
    })?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Scan { file } => {
            let settings = PreheatSettings::from_store(&store);
            let outcome = FileSetpointScanner::new(&settings.setpoints).try_scan(&file)?;
            tracing::info!("Scanned {} lines ({:?})", outcome.lines_scanned, outcome.stop);
            println!("{}", serde_json::to_string(&outcome.result)?);
        }
        Commands::Run => run(store, cli.base_dir).await?,
    }
    Ok(())
}

async fn run(
    store: TomlSettingsStore,
    base_dir: PathBuf,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let (command_tx, mut command_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(command) = command_rx.recv().await {
            if let Err(e) = stdout.write_all(format!("{}\n", command).as_bytes()).await {
                tracing::error!("Failed to write command '{}': {}", command, e);
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    tracing::info!("Resolving local print files against: {}", base_dir.display());
    let engine = SharedPreheatEngine::new(PreheatEngine::new(
        Box::new(store),
        Box::new(LocalFileManager::with_directory(base_dir)),
        Box::new(ChannelCommandSink::new(command_tx)),
    ));
    engine.on_event(&TriggerEvent::ProcessStartup);

    let events = HostEventQueue::new(64);
    let (queued, handled) = tokio::join!(
        events.pump_json_lines(BufReader::new(tokio::io::stdin())),
        run_dispatcher(&engine, &events)
    );
    tracing::info!("Handled {} of {} host events", handled, queued);

    // Dropping the engine closes the command channel and ends the writer
    drop(engine);
    writer.await?;
    Ok(())
}
