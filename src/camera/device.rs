//! Live video contract.

use crate::constants::camera::FACING_MODE;
use crate::error::Result;
use async_trait::async_trait;
use image::RgbImage;
use std::sync::Arc;

/// Requested stream properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Preferred camera facing (`"environment"` or `"user"`).
    pub facing_mode: String,
    /// Ideal frame width.
    pub width: Option<u32>,
    /// Ideal frame height.
    pub height: Option<u32>,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FACING_MODE.to_string(),
            width: None,
            height: None,
        }
    }
}

/// Settings reported by the video track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackSettings {
    /// Reported width, if any.
    pub width: Option<u32>,
    /// Reported height, if any.
    pub height: Option<u32>,
}

impl TrackSettings {
    /// Raster size for a snapshot: each reported dimension, or the fallback
    /// when a dimension is missing or zero.
    pub fn raster_size(self, fallback_width: u32, fallback_height: u32) -> (u32, u32) {
        (
            self.width.filter(|w| *w > 0).unwrap_or(fallback_width),
            self.height.filter(|h| *h > 0).unwrap_or(fallback_height),
        )
    }
}

/// A source of live video streams.
#[async_trait]
pub trait VideoDevice: Send + Sync {
    /// Whether live capture exists on this platform at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Open a stream. Fails when access is denied or the hardware errors.
    async fn get_stream(&self, constraints: &StreamConstraints) -> Result<Arc<dyn VideoStream>>;
}

/// An open video stream with a single video track.
#[async_trait]
pub trait VideoStream: Send + Sync {
    /// Current track settings.
    fn settings(&self) -> TrackSettings;

    /// The frame currently shown by the stream, at its native size.
    async fn current_frame(&self) -> Result<RgbImage>;

    /// Stop every track. Idempotent.
    fn stop(&self);

    /// Whether the tracks are still running.
    fn is_live(&self) -> bool;
}
