//! Display formatting of raw predictions.

use crate::constants::probability::DECIMAL_PLACES;
use crate::inference::Prediction;
use serde::Serialize;

/// A prediction ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPrediction {
    /// Title-cased label.
    pub label: String,
    /// Probability as a percentage string, e.g. `"87.5%"`.
    pub percentage: String,
    /// Raw probability.
    pub probability: f32,
}

/// Title-case the first comma-separated synonym of a model label.
///
/// `"red admiral, vanessa atalanta"` becomes `"Red Admiral"`.
pub fn format_label(raw: &str) -> String {
    let primary = raw.split(',').next().unwrap_or_default();
    primary
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Format a probability as a percentage with one decimal place.
pub fn format_percentage(probability: f32) -> String {
    format!(
        "{:.prec$}%",
        f64::from(probability) * 100.0,
        prec = DECIMAL_PLACES
    )
}

/// Format every prediction, preserving order and length.
pub fn rank(predictions: &[Prediction]) -> Vec<RankedPrediction> {
    predictions
        .iter()
        .map(|p| RankedPrediction {
            label: format_label(&p.label),
            percentage: format_percentage(p.probability),
            probability: p.probability,
        })
        .collect()
}
