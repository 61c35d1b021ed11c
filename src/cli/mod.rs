//! CLI argument parsing and command handling.

mod args;
pub mod help;
pub mod species;
mod validators;

pub use args::{CaptureArgs, Cli, Command, ConfigAction, IdentifyArgs};
