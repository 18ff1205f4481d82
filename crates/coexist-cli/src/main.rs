mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod ui;
mod utils;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::error::{CliError, Result};
use crate::ui::{UiEvent, UiManager};
use clap::Parser;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Time given to the UI task to flush before the final error is printed.
const ERROR_FLUSH_DELAY: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        tokio::time::sleep(ERROR_FLUSH_DELAY).await;
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Routes panics through tracing so they reach the log file as well as the UI.
fn install_panic_reporting() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook
        .install()
        .map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |info| {
        error!("{}", panic_hook.panic_report(info));
    }));
    Ok(())
}

fn configure_thread_pool(threads: Option<usize>) -> Result<()> {
    let Some(threads) = threads else {
        return Ok(());
    };
    info!("Using {} worker thread(s) for parallel stages.", threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Cannot size the worker pool: {}", e)))
}

async fn dispatch(
    command: Commands,
    global: &GlobalArgs,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<()> {
    match command {
        Commands::Init(args) => commands::init::run(args, global).await,
        Commands::Status => commands::status::run(global).await,
        Commands::Run(args) => commands::run::run(args, global, ui_sender).await,
        Commands::Analyze(args) => commands::analyze::run(args, global, ui_sender).await,
        Commands::Report(args) => commands::report::run(args, global).await,
    }
}

async fn run_app() -> Result<()> {
    let (ui_manager, ui_sender, shutdown_sender) = UiManager::new();
    let ui_task = tokio::spawn(ui_manager.run());

    let Cli { command, global } = Cli::parse();
    logging::setup_logging(
        global.verbose,
        global.quiet,
        global.log_file.as_deref(),
        ui_sender.clone(),
    )?;
    install_panic_reporting()?;

    info!("coexist v{}", env!("CARGO_PKG_VERSION"));
    debug!("Command: {:?}; global options: {:?}", command, global);

    let outcome = match configure_thread_pool(global.threads) {
        Ok(()) => dispatch(command, &global, ui_sender).await,
        Err(e) => Err(e),
    };

    match &outcome {
        Ok(()) => {
            info!("Command finished.");
            println!("✅ Done.");
        }
        Err(e) => error!("Command failed: {}", e),
    }

    if shutdown_sender.send(true).is_err() {
        warn!("UI task stopped before the shutdown signal.");
    }
    ui_task
        .await
        .map_err(|e| CliError::Other(anyhow::anyhow!("UI task failed: {}", e)))?;

    outcome
}
