//! CLI argument definitions.

use crate::cli::validators::parse_dimension;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Identify butterflies in photos with an image-classification model.
#[derive(Debug, Parser)]
#[command(name = "wingspot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Image files (or `data:` URIs) to identify, in order.
    pub images: Vec<String>,

    /// Options shared by every classification.
    #[command(flatten)]
    pub identify: IdentifyArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Snapshot a camera and identify the frame.
    Capture(CaptureArgs),
    /// Print the species reference cards.
    Species,
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for `capture`.
#[derive(Debug, Args)]
pub struct CaptureArgs {
    /// Still image replayed as the live camera feed.
    #[arg(long)]
    pub frame: PathBuf,

    /// Requested frame width (defaults to the feed's own width).
    #[arg(long, value_parser = parse_dimension, requires = "height")]
    pub width: Option<u32>,

    /// Requested frame height (defaults to the feed's own height).
    #[arg(long, value_parser = parse_dimension, requires = "width")]
    pub height: Option<u32>,

    /// Camera facing mode.
    #[arg(long, default_value = crate::constants::camera::FACING_MODE)]
    pub facing: String,
}

/// Options shared by every classification.
#[derive(Debug, Args)]
pub struct IdentifyArgs {
    /// Path to ONNX model file (overrides config).
    #[arg(long, global = true, env = "WINGSPOT_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Path to labels file (overrides config).
    #[arg(long, global = true, env = "WINGSPOT_LABELS_PATH")]
    pub labels_path: Option<PathBuf>,

    /// Inference timeout in seconds, 0 disables (overrides config).
    #[arg(long, global = true, env = "WINGSPOT_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Emit newline-delimited JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Hide the busy spinner.
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Only show warnings and errors in logs.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace+ORT info, -vvv: trace+ORT debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
