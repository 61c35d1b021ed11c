//! Decoded in-memory images.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use std::io::Cursor;

/// Where an [`ImageBuffer`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOrigin {
    /// Uploaded, dropped or picked file.
    File {
        /// File name as submitted.
        name: String,
    },
    /// Snapshot of a live camera.
    Camera,
    /// Inline `data:` URI.
    DataUri,
}

impl ImageOrigin {
    /// Short human-readable name of the source.
    pub fn name(&self) -> &str {
        match self {
            Self::File { name } => name,
            Self::Camera => "camera snapshot",
            Self::DataUri => "data URI",
        }
    }
}

/// A decoded, renderable image.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    image: DynamicImage,
    origin: ImageOrigin,
}

impl ImageBuffer {
    /// Wrap an already decoded image.
    pub fn new(image: DynamicImage, origin: ImageOrigin) -> Self {
        Self { image, origin }
    }

    /// Decode raw image bytes off the async executor.
    pub async fn decode(bytes: Vec<u8>, origin: ImageOrigin) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::decode_blocking(&bytes, origin))
            .await
            .map_err(|e| Error::Internal {
                message: format!("decode task failed: {e}"),
            })?
    }

    /// Decode a `data:<type>;base64,<payload>` URI.
    pub async fn from_data_uri(uri: &str) -> Result<Self> {
        let (_, bytes) = parse_data_uri(uri)?;
        Self::decode(bytes, ImageOrigin::DataUri).await
    }

    /// Decode raw image bytes on the current thread.
    pub fn decode_blocking(bytes: &[u8], origin: ImageOrigin) -> Result<Self> {
        let image = image::load_from_memory(bytes).map_err(|e| Error::Decode {
            name: origin.name().to_string(),
            source: Box::new(e),
        })?;
        Ok(Self { image, origin })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Source of this image.
    pub const fn origin(&self) -> &ImageOrigin {
        &self.origin
    }

    /// Borrow the decoded pixels.
    pub const fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// RGB copy of the pixels, as classifiers expect.
    pub fn to_rgb8(&self) -> RgbImage {
        self.image.to_rgb8()
    }

    /// Render as a JPEG `data:` URI for previews.
    pub fn to_data_uri(&self, quality: u8) -> Result<String> {
        let jpeg = encode_jpeg(&self.to_rgb8(), quality)?;
        Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg)))
    }
}

/// Encode RGB pixels as JPEG at the given quality (1-100).
pub fn encode_jpeg(pixels: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    DynamicImage::ImageRgb8(pixels.clone())
        .write_with_encoder(encoder)
        .map_err(|e| Error::Decode {
            name: "jpeg encoder".to_string(),
            source: Box::new(e),
        })?;
    Ok(out.into_inner())
}

/// Split a base64 `data:` URI into its declared media type and payload.
///
/// An empty media type defaults to `text/plain`.
pub(crate) fn parse_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let name = ImageOrigin::DataUri.name().to_string();
    let (header, payload) = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| Error::Decode {
            name: name.clone(),
            source: "not a data URI".into(),
        })?;

    let Some(params) = header.strip_suffix(";base64") else {
        return Err(Error::Decode {
            name,
            source: "only base64 data URIs are supported".into(),
        });
    };

    let media_type = match params.split(';').next() {
        Some(media_type) if !media_type.is_empty() => media_type.to_ascii_lowercase(),
        _ => "text/plain".to_string(),
    };

    let bytes = STANDARD.decode(payload.trim()).map_err(|e| Error::Decode {
        name,
        source: Box::new(e),
    })?;
    Ok((media_type, bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let pixels = RgbImage::from_pixel(width, height, Rgb([200, 120, 40]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(pixels)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_decode_png() {
        let buffer = ImageBuffer::decode(png_bytes(12, 7), ImageOrigin::Camera)
            .await
            .unwrap();
        assert_eq!(buffer.width(), 12);
        assert_eq!(buffer.height(), 7);
        assert_eq!(buffer.origin(), &ImageOrigin::Camera);
    }

    #[tokio::test]
    async fn test_decode_garbage_fails() {
        let origin = ImageOrigin::File {
            name: "broken.jpg".to_string(),
        };
        let result = ImageBuffer::decode(b"definitely not pixels".to_vec(), origin).await;
        assert!(matches!(result, Err(Error::Decode { ref name, .. }) if name == "broken.jpg"));
    }

    #[tokio::test]
    async fn test_data_uri_preview_decodes_back() {
        let buffer = ImageBuffer::decode(png_bytes(16, 16), ImageOrigin::Camera)
            .await
            .unwrap();
        let uri = buffer.to_data_uri(92).unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));

        let decoded = ImageBuffer::from_data_uri(&uri).await.unwrap();
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.origin(), &ImageOrigin::DataUri);
    }

    #[test]
    fn test_parse_data_uri_rejects_plain_text() {
        assert!(parse_data_uri("hello").is_err());
        assert!(parse_data_uri("data:text/plain,hello").is_err());
    }

    #[test]
    fn test_parse_data_uri_media_type() {
        let (media_type, bytes) = parse_data_uri("data:image/PNG;base64,aGk=").unwrap();
        assert_eq!(media_type, "image/png");
        assert_eq!(bytes, b"hi");

        let (media_type, _) = parse_data_uri("data:;base64,aGk=").unwrap();
        assert_eq!(media_type, "text/plain");
    }
}
