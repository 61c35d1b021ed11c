//! Scoped ownership of an open camera stream.

use crate::camera::{StreamConstraints, TrackSettings, VideoDevice, VideoStream};
use crate::config::CameraConfig;
use crate::error::{Error, Result};
use crate::photo::{ImageBuffer, from_camera_frame};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex};
use tracing::{debug, info};

/// Snapshot parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Raster width when the track reports none.
    pub fallback_width: u32,
    /// Raster height when the track reports none.
    pub fallback_height: u32,
    /// JPEG quality of the intermediate encoding.
    pub jpeg_quality: u8,
}

impl From<&CameraConfig> for CaptureOptions {
    fn from(config: &CameraConfig) -> Self {
        Self {
            fallback_width: config.width,
            fallback_height: config.height,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self::from(&CameraConfig::default())
    }
}

/// RAII guard for an open camera.
///
/// The stream is stopped when a snapshot is taken, when the camera is closed,
/// when the guard is dropped, and on Ctrl+C via [`release_all_streams`].
pub struct LiveCamera {
    id: u64,
    stream: Arc<dyn VideoStream>,
    released: bool,
}

impl LiveCamera {
    /// Open a stream on `device`.
    pub async fn open(device: &dyn VideoDevice, constraints: &StreamConstraints) -> Result<Self> {
        if !device.is_supported() {
            return Err(Error::CameraUnsupported {
                reason: "no live video device available".to_string(),
            });
        }

        let stream = device.get_stream(constraints).await?;
        let id = register_stream(&stream);
        let settings = stream.settings();
        info!(
            "Camera opened (facing {}, {}x{})",
            constraints.facing_mode,
            settings.width.map_or_else(|| "?".to_string(), |w| w.to_string()),
            settings.height.map_or_else(|| "?".to_string(), |h| h.to_string()),
        );

        Ok(Self {
            id,
            stream,
            released: false,
        })
    }

    /// Settings reported by the video track.
    pub fn settings(&self) -> TrackSettings {
        self.stream.settings()
    }

    /// Capture the current frame and release the camera.
    pub async fn snapshot(mut self, options: CaptureOptions) -> Result<ImageBuffer> {
        let (width, height) = self
            .settings()
            .raster_size(options.fallback_width, options.fallback_height);
        debug!("Capturing {width}x{height} frame");

        let result =
            from_camera_frame(self.stream.as_ref(), width, height, options.jpeg_quality).await;
        self.release();
        result
    }

    /// Release the camera without capturing.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.stream.stop();
        unregister_stream(self.id);
        self.released = true;
        debug!("Camera released");
    }
}

impl Drop for LiveCamera {
    fn drop(&mut self) {
        self.release();
    }
}

static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(1);

/// Global registry of open streams for release on signal.
static ACTIVE_STREAMS: LazyLock<Mutex<Vec<(u64, Arc<dyn VideoStream>)>>> =
    LazyLock::new(|| Mutex::new(Vec::new()));

fn register_stream(stream: &Arc<dyn VideoStream>) -> u64 {
    let id = NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed);
    if let Ok(mut streams) = ACTIVE_STREAMS.lock() {
        streams.push((id, Arc::clone(stream)));
    }
    id
}

fn unregister_stream(id: u64) {
    if let Ok(mut streams) = ACTIVE_STREAMS.lock() {
        streams.retain(|(active, _)| *active != id);
    }
}

/// Stop every registered stream. Called on signal.
pub fn release_all_streams() {
    if let Ok(mut streams) = ACTIVE_STREAMS.lock() {
        for (_, stream) in streams.drain(..) {
            stream.stop();
        }
    }
}
