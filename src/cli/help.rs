//! Help message display for CLI.

#![allow(clippy::print_stdout)]

use crate::config::Config;

/// Print help message based on configuration state.
pub fn print_smart_help(config: &Config) {
    if needs_setup(config) {
        print_first_time_help();
    } else {
        print_configured_help();
    }
}

/// Whether no model has been configured yet.
pub fn needs_setup(config: &Config) -> bool {
    config.model.path.is_none() || config.model.labels.is_none()
}

/// Print detailed setup guide for first-time users.
pub fn print_first_time_help() {
    println!("No model configured. Get started with wingspot:");
    println!();
    println!("1. Initialize configuration:");
    println!("   wingspot config init");
    println!();
    println!("2. Export a MobileNet v2 (alpha 1.0, 224px) image classifier to ONNX");
    println!("   together with its labels file (one label per line).");
    println!();
    println!("3. Point the configuration at both files:");
    println!("   [model]");
    println!("   path = \"/path/to/mobilenet_v2.onnx\"");
    println!("   labels = \"/path/to/labels.txt\"");
    println!();
    println!("4. Identify a photo:");
    println!("   wingspot butterfly.jpg");
    println!();
    println!("Run 'wingspot -h' for all options or 'wingspot species' for the field guide.");
}

/// Print brief usage reminder for configured users.
pub fn print_configured_help() {
    println!("Usage: wingspot [IMAGES]... [OPTIONS]");
    println!();
    println!("Example: wingspot monarch.jpg --json");
    println!();
    println!("Run 'wingspot -h' for all options or 'wingspot capture --frame <PATH>' to use a camera feed.");
}
