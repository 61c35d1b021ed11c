//! Wingspot - butterfly identification from photos.
//!
//! This crate provides the classification pipeline (lazy model session,
//! single-flight orchestrator, ranking and history) and a CLI front end.

#![warn(missing_docs)]

pub mod camera;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod inference;
pub mod output;
pub mod photo;
pub mod pipeline;

use camera::{LiveCamera, StillFrameDevice, StreamConstraints};
use clap::Parser;
use cli::{CaptureArgs, Cli, Command, IdentifyArgs};
use config::{Config, config_file_path, load_default_config, save_default_config};
use inference::{ModelSelector, ModelSession};
use output::{BusySpinner, ErrorPayload, EventType, ImageResultPayload, SessionSummaryPayload};
use photo::{ImageFile, ImageOrigin};
use pipeline::{Orchestrator, OrchestratorOptions, Outcome};
use std::path::Path;
use tracing::{info, warn};

pub use error::{Error, Result};

/// Main entry point for the wingspot CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.identify.verbose, cli.identify.quiet);

    // Release any open camera on interrupt
    if let Err(e) = ctrlc::set_handler(|| {
        camera::release_all_streams();
        std::process::exit(130); // 128 + SIGINT(2)
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }

    let json = cli.identify.json;
    execute(cli).inspect_err(|e| {
        if json {
            report_error(e);
        }
    })
}

fn execute(cli: Cli) -> Result<()> {
    // Load configuration, then apply CLI and environment overrides
    let mut config = load_default_config()?;
    apply_overrides(&mut config, &cli.identify);

    if let Some(command) = cli.command {
        return handle_command(command, &config, &cli.identify);
    }

    // Show help if no images provided
    if cli.images.is_empty() {
        cli::help::print_smart_help(&config);
        return Ok(());
    }

    build_runtime()?.block_on(identify_images(&cli.images, &config, &cli.identify))
}

/// Emit a startup error as a JSON event before the process exits.
fn report_error(err: &Error) {
    if let Err(e) = output::emit(EventType::Error, ErrorPayload::from(err)) {
        warn!("Failed to emit error event: {e}");
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // ORT logging is suppressed unless verbosity is raised.
    let filter_str = if quiet {
        "warn,ort=off".to_string()
    } else {
        match verbose {
            0 => "info,ort=off".to_string(),
            1 => "debug,ort=warn".to_string(),
            2 => "trace,ort=info".to_string(),
            _ => "trace".to_string(), // -vvv: no ORT filter, full trace
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    // Logs go to stderr so stdout stays clean for results and JSON.
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Apply command-line and environment overrides on top of the config file.
pub fn apply_overrides(config: &mut Config, args: &IdentifyArgs) {
    if let Some(path) = &args.model_path {
        config.model.path = Some(path.clone());
    }
    if let Some(path) = &args.labels_path {
        config.model.labels = Some(path.clone());
    }
    if let Some(secs) = args.timeout {
        config.session.inference_timeout_secs = secs;
    }
}

/// Build an orchestrator over the backend compiled into this build.
pub fn build_orchestrator(config: &Config) -> Orchestrator {
    let model = ModelSession::new(
        inference::default_backend(),
        ModelSelector::from(&config.model),
        config.model.load_failure,
    );
    Orchestrator::new(model, OrchestratorOptions::from(config))
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| Error::Internal {
        message: format!("Failed to create async runtime: {e}"),
    })
}

const fn progress_enabled(args: &IdentifyArgs) -> bool {
    !args.quiet && !args.no_progress && !args.json
}

async fn identify_images(images: &[String], config: &Config, args: &IdentifyArgs) -> Result<()> {
    let orchestrator = build_orchestrator(config);
    let spinner = BusySpinner::start(
        orchestrator.subscribe_busy(),
        orchestrator.subscribe_phase(),
        progress_enabled(args),
    );

    let data_uri = ImageOrigin::DataUri;
    info!("Identifying {} image(s)", images.len());
    for image in images {
        let (source, outcome) = if image.starts_with("data:") {
            let outcome = match ImageFile::from_data_uri(image) {
                Ok(file) => orchestrator.submit_file(file).await,
                Err(e) => orchestrator.report(&e),
            };
            (data_uri.name(), outcome)
        } else {
            let outcome = match ImageFile::open(Path::new(image)).await {
                Ok(file) => orchestrator.submit_file(file).await,
                Err(e) => orchestrator.report(&e),
            };
            (image.as_str(), outcome)
        };
        print_outcome(source, &outcome, args.json)?;
    }

    drop(spinner);
    print_summary(&orchestrator, args.json)
}

async fn capture(args: &CaptureArgs, config: &Config, identify: &IdentifyArgs) -> Result<()> {
    let orchestrator = build_orchestrator(config);
    let spinner = BusySpinner::start(
        orchestrator.subscribe_busy(),
        orchestrator.subscribe_phase(),
        progress_enabled(identify),
    );

    let device = StillFrameDevice::new(&args.frame);
    info!("Replaying {} as camera feed", device.path().display());
    let constraints = StreamConstraints {
        facing_mode: args.facing.clone(),
        width: args.width,
        height: args.height,
    };

    let outcome = match LiveCamera::open(&device, &constraints).await {
        Ok(camera) => orchestrator.submit_camera_frame(camera).await,
        Err(e) => orchestrator.report(&e),
    };

    drop(spinner);
    let origin = ImageOrigin::Camera;
    print_outcome(origin.name(), &outcome, identify.json)?;
    print_summary(&orchestrator, identify.json)
}

fn print_outcome(source: &str, outcome: &Outcome, json: bool) -> Result<()> {
    if json {
        output::emit(
            EventType::ImageResult,
            ImageResultPayload::new(source, outcome),
        )
    } else {
        print!("{}", output::render_outcome(source, outcome));
        Ok(())
    }
}

fn print_summary(orchestrator: &Orchestrator, json: bool) -> Result<()> {
    let history = orchestrator.history();
    let completed_scans = orchestrator.completed_scans();

    if json {
        output::emit(
            EventType::SessionSummary,
            SessionSummaryPayload {
                history: history.to_vec(),
                completed_scans,
            },
        )
    } else {
        println!();
        print!("{}", output::render_summary(&history, completed_scans));
        Ok(())
    }
}

fn handle_command(command: Command, config: &Config, identify: &IdentifyArgs) -> Result<()> {
    match command {
        Command::Capture(args) => build_runtime()?.block_on(capture(&args, config, identify)),
        Command::Species => {
            if identify.json {
                output::emit(EventType::SpeciesList, cli::species::SPECIES)
            } else {
                print!("{}", output::render_species(&cli::species::SPECIES));
                Ok(())
            }
        }
        Command::Config { action } => handle_config_command(action, identify.json),
    }
}

fn handle_config_command(action: cli::ConfigAction, json: bool) -> Result<()> {
    use cli::ConfigAction;

    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let config = Config::default();
                let saved_path = save_default_config(&config)?;
                println!("Created configuration file: {}", saved_path.display());
                println!("\nNext steps:");
                println!("  set [model].path and [model].labels in that file");
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            if json {
                output::emit(EventType::Config, &config)
            } else {
                let contents = toml::to_string_pretty(&config)
                    .map_err(|e| Error::ConfigSerialize { source: e })?;
                print!("{contents}");
                Ok(())
            }
        }
        ConfigAction::Path => {
            let path = config_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
