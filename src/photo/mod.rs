//! Image sources: submitted files, camera frames and data URIs.

mod buffer;
mod file;
mod frame;

pub use buffer::{ImageBuffer, ImageOrigin, encode_jpeg};
pub use file::{ImageFile, media_type_for_path};
pub use frame::from_camera_frame;

use crate::error::Result;

/// Validate a submitted file and decode it.
///
/// Media type and size are rejected before any bytes are read.
pub async fn from_file(file: ImageFile) -> Result<ImageBuffer> {
    file.validate()?;
    file.load().await
}
