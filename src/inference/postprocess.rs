//! Turning raw logits into predictions.

use crate::constants::probability;
use crate::error::{Error, Result};
use crate::inference::Prediction;
use std::cmp::Ordering;
use std::path::Path;

/// Read a labels file: one label per line, blank lines skipped.
pub fn read_labels(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::ModelLoad {
        reason: format!("cannot read labels {}: {e}", path.display()),
    })?;
    let labels = parse_labels(&contents);
    if labels.is_empty() {
        return Err(Error::ModelLoad {
            reason: format!("labels file {} is empty", path.display()),
        });
    }
    Ok(labels)
}

/// Parse labels from text. A leading index column (`"321 admiral"`) is dropped.
pub fn parse_labels(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(char::is_whitespace) {
            Some((index, rest)) if index.chars().all(|c| c.is_ascii_digit()) => {
                rest.trim().to_string()
            }
            _ => line.to_string(),
        })
        .collect()
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return vec![0.0; logits.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}

/// Highest `k` probabilities paired with their labels, best first.
///
/// When the model emits one more score than there are labels, the first score
/// is a background class and is skipped.
pub fn top_k_predictions(probabilities: &[f32], labels: &[String], k: usize) -> Vec<Prediction> {
    let offset = usize::from(probabilities.len() == labels.len() + 1);

    let mut indexed: Vec<(usize, f32)> = probabilities
        .iter()
        .copied()
        .enumerate()
        .skip(offset)
        .filter(|(_, p)| p.is_finite())
        .collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    indexed
        .into_iter()
        .filter_map(|(i, p)| {
            labels.get(i - offset).map(|label| {
                Prediction::new(label.clone(), p.clamp(probability::MIN, probability::MAX))
            })
        })
        .take(k)
        .collect()
}
