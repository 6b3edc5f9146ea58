use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod controller;
mod domain;
mod grid;
mod inputter;
mod loader;
mod model;
mod ui;

use controller::Controller;
use domain::{DGConfig, DGError};
use model::{Model, Status};
use ui::GridUI;

/// A tui based data grid viewer for tabular files.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Tabular data file to open (csv, parquet or arrow). Without a file
    /// the built-in demo dataset is shown.
    file: Option<String>,

    /// Rows per page
    #[arg(long, default_value_t = domain::DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Value shown as 100% by progress bar columns
    #[arg(long, default_value_t = domain::DEFAULT_PROGRESS_CEILING)]
    progress_ceiling: f64,

    /// Write a debug log to this file
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn run() -> Result<(), DGError> {
    let cli = Cli::parse();

    if let Some(log) = &cli.log {
        init_tracing(log)?;
    }

    let config = DGConfig::default()
        .page_size(cli.page_size)
        .progress_ceiling(cli.progress_ceiling);

    let path = match &cli.file {
        Some(file) => Some(PathBuf::from(
            shellexpand::full(file)
                .map_err(|e| DGError::LoadingFailed(e.to_string()))?
                .into_owned(),
        )),
        None => None,
    };

    // Load before entering the alternate screen so errors print cleanly.
    let dataset = loader::load(path.as_deref(), &config)?;
    let mut model = Model::new(dataset, &config)?;
    let ui = GridUI::new();
    let controller = Controller::new(&config);

    let mut terminal = ratatui::init();
    info!("Entering the main loop ...");
    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(model.get_uidata(), f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message)?;
        }
    }

    Ok(())
}

fn init_tracing(path: &Path) -> Result<(), DGError> {
    let log_file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .init();

    info!("Logging initialized");
    Ok(())
}
