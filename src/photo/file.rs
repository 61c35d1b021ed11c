//! Submitted image files.
//!
//! Drag-and-drop hands over bytes that are already in memory, the file picker
//! hands over a path. Both carry a declared media type and size, which are
//! checked before any bytes are read or decoded.

use crate::constants::{IMAGE_MEDIA_PREFIX, MAX_IMAGE_BYTES};
use crate::error::{Error, Result};
use crate::photo::buffer::parse_data_uri;
use crate::photo::{ImageBuffer, ImageOrigin};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Where the bytes of an [`ImageFile`] live.
#[derive(Debug, Clone)]
enum Contents {
    Memory(Vec<u8>),
    Disk(PathBuf),
}

/// A file-like submission with a declared media type and size.
#[derive(Debug, Clone)]
pub struct ImageFile {
    name: String,
    media_type: String,
    size: u64,
    contents: Contents,
}

impl ImageFile {
    /// File whose bytes are already in memory (drag-and-drop).
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            contents: Contents::Memory(bytes),
        }
    }

    /// File on disk (file picker). Only metadata is read here.
    pub async fn open(path: &Path) -> Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );

        Ok(Self {
            name,
            media_type: media_type_for_path(path).to_string(),
            size: metadata.len(),
            contents: Contents::Disk(path.to_path_buf()),
        })
    }

    /// File carried inline as a base64 `data:` URI.
    ///
    /// The URI's declared media type is kept for validation.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let (media_type, bytes) = parse_data_uri(uri)?;
        Ok(Self::from_bytes(ImageOrigin::DataUri.name(), media_type, bytes))
    }

    /// File name as submitted.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Declared size in bytes.
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Check media type, then size.
    pub fn validate(&self) -> Result<()> {
        if !self.media_type.starts_with(IMAGE_MEDIA_PREFIX) {
            return Err(Error::InvalidMediaType {
                name: self.name.clone(),
                media_type: self.media_type.clone(),
            });
        }

        if self.size > MAX_IMAGE_BYTES {
            return Err(Error::FileTooLarge {
                name: self.name.clone(),
                size: self.size,
                limit: MAX_IMAGE_BYTES,
            });
        }

        Ok(())
    }

    /// Read and decode the contents without validating.
    pub async fn load(self) -> Result<ImageBuffer> {
        let origin = ImageOrigin::File { name: self.name };
        let bytes = match self.contents {
            Contents::Memory(bytes) => bytes,
            Contents::Disk(path) => read_capped(&path, origin.name()).await?,
        };
        ImageBuffer::decode(bytes, origin).await
    }
}

/// Read a file from disk, failing once it exceeds the size limit.
async fn read_capped(path: &Path, name: &str) -> Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut bytes = Vec::new();
    file.take(MAX_IMAGE_BYTES + 1).read_to_end(&mut bytes).await?;

    let size = bytes.len() as u64;
    if size > MAX_IMAGE_BYTES {
        return Err(Error::FileTooLarge {
            name: name.to_string(),
            size,
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(bytes)
}

/// Declared media type of a file on disk, from its extension.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return "application/octet-stream";
    };

    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}
