//! Camera frame snapshots.

use crate::camera::VideoStream;
use crate::error::{Error, Result};
use crate::photo::{ImageBuffer, ImageOrigin, encode_jpeg};
use image::imageops::{self, FilterType};

/// Rasterize the current frame of `stream` at `width`x`height`, round-trip it
/// through JPEG at `quality`, and decode the result.
pub async fn from_camera_frame(
    stream: &dyn VideoStream,
    width: u32,
    height: u32,
    quality: u8,
) -> Result<ImageBuffer> {
    let frame = stream.current_frame().await?;

    tokio::task::spawn_blocking(move || {
        let raster = if frame.dimensions() == (width, height) {
            frame
        } else {
            imageops::resize(&frame, width, height, FilterType::Triangle)
        };
        let jpeg = encode_jpeg(&raster, quality)?;
        ImageBuffer::decode_blocking(&jpeg, ImageOrigin::Camera)
    })
    .await
    .map_err(|e| Error::Internal {
        message: format!("snapshot task failed: {e}"),
    })?
}
