//! Still image replayed as a live camera.
//!
//! Stands in for a real webcam on headless machines and in tests.

use crate::camera::{StreamConstraints, TrackSettings, VideoDevice, VideoStream};
use crate::error::{Error, Result};
use async_trait::async_trait;
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Device whose every stream shows the same still frame.
#[derive(Debug, Clone)]
pub struct StillFrameDevice {
    path: PathBuf,
}

impl StillFrameDevice {
    /// Device backed by the image at `path`. The file is read when a stream
    /// is opened.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the still frame.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl VideoDevice for StillFrameDevice {
    async fn get_stream(&self, constraints: &StreamConstraints) -> Result<Arc<dyn VideoStream>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| Error::CameraAccess {
                reason: format!("cannot open {}: {e}", self.path.display()),
            })?;

        let frame = image::load_from_memory(&bytes)
            .map_err(|e| Error::CameraAccess {
                reason: format!("unreadable frame {}: {e}", self.path.display()),
            })?
            .to_rgb8();

        let settings = TrackSettings {
            width: constraints.width.or(Some(frame.width())),
            height: constraints.height.or(Some(frame.height())),
        };

        Ok(Arc::new(StillFrameStream {
            frame,
            settings,
            live: AtomicBool::new(true),
        }))
    }
}

struct StillFrameStream {
    frame: RgbImage,
    settings: TrackSettings,
    live: AtomicBool,
}

#[async_trait]
impl VideoStream for StillFrameStream {
    fn settings(&self) -> TrackSettings {
        self.settings
    }

    async fn current_frame(&self) -> Result<RgbImage> {
        if !self.is_live() {
            return Err(Error::CameraAccess {
                reason: "track ended".to_string(),
            });
        }
        Ok(self.frame.clone())
    }

    fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};
    use tempfile::NamedTempFile;

    fn still_png() -> NamedTempFile {
        let file = NamedTempFile::with_suffix(".png").unwrap();
        RgbImage::from_pixel(40, 30, Rgb([1, 2, 3]))
            .save_with_format(file.path(), ImageFormat::Png)
            .unwrap();
        file
    }

    #[tokio::test]
    async fn test_stream_reports_natural_size() {
        let file = still_png();
        let device = StillFrameDevice::new(file.path());
        let stream = device
            .get_stream(&StreamConstraints::default())
            .await
            .unwrap();

        assert_eq!(
            stream.settings(),
            TrackSettings {
                width: Some(40),
                height: Some(30)
            }
        );
        assert_eq!(stream.current_frame().await.unwrap().dimensions(), (40, 30));
    }

    #[tokio::test]
    async fn test_stream_reports_requested_size() {
        let file = still_png();
        let device = StillFrameDevice::new(file.path());
        let constraints = StreamConstraints {
            width: Some(320),
            height: Some(240),
            ..StreamConstraints::default()
        };
        let stream = device.get_stream(&constraints).await.unwrap();
        assert_eq!(stream.settings().raster_size(640, 480), (320, 240));
    }

    #[tokio::test]
    async fn test_stopped_stream_has_no_frames() {
        let file = still_png();
        let device = StillFrameDevice::new(file.path());
        let stream = device
            .get_stream(&StreamConstraints::default())
            .await
            .unwrap();

        stream.stop();
        stream.stop();
        assert!(!stream.is_live());
        assert!(matches!(
            stream.current_frame().await,
            Err(Error::CameraAccess { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_frame_is_access_error() {
        let device = StillFrameDevice::new("/nonexistent/frame.png");
        let result = device.get_stream(&StreamConstraints::default()).await;
        assert!(matches!(result, Err(Error::CameraAccess { .. })));
    }
}
