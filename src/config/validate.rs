//! Configuration validation.

use crate::config::Config;
use crate::constants::model::{SUPPORTED_ALPHAS, SUPPORTED_VERSIONS};
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_model(config)?;
    validate_camera(config)?;
    Ok(())
}

/// Validate classifier selectors.
fn validate_model(config: &Config) -> Result<()> {
    let model = &config.model;

    if !SUPPORTED_VERSIONS.contains(&model.version) {
        return Err(Error::ConfigValidation {
            message: format!(
                "model.version must be one of {SUPPORTED_VERSIONS:?}, got {}",
                model.version
            ),
        });
    }

    if !SUPPORTED_ALPHAS
        .iter()
        .any(|a| (a - model.alpha).abs() < f32::EPSILON)
    {
        return Err(Error::ConfigValidation {
            message: format!(
                "model.alpha must be one of {SUPPORTED_ALPHAS:?}, got {}",
                model.alpha
            ),
        });
    }

    if model.top_k == 0 {
        return Err(Error::ConfigValidation {
            message: "model.top_k must be at least 1".to_string(),
        });
    }

    if model.input_size == 0 {
        return Err(Error::ConfigValidation {
            message: "model.input_size must be at least 1".to_string(),
        });
    }

    Ok(())
}

/// Validate capture settings.
fn validate_camera(config: &Config) -> Result<()> {
    let camera = &config.camera;

    if camera.width == 0 || camera.height == 0 {
        return Err(Error::ConfigValidation {
            message: format!(
                "camera size must be non-zero, got {}x{}",
                camera.width, camera.height
            ),
        });
    }

    if !(1..=100).contains(&camera.jpeg_quality) {
        return Err(Error::ConfigValidation {
            message: format!(
                "camera.jpeg_quality must be between 1 and 100, got {}",
                camera.jpeg_quality
            ),
        });
    }

    Ok(())
}
