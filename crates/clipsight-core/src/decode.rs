//! Image decoding with format detection, validation, and timeout support.
//!
//! Accepts raw uploaded bytes or base64 text (optionally wrapped in a
//! `data:` URI) and produces an RGB image ready for embedding.

use std::io::Cursor;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, GenericImageView};
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult};

/// Image decoder with configurable limits and timeout.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    limits: LimitsConfig,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an image from an in-memory byte buffer with validation and timeout.
    pub async fn decode_from_bytes(&self, bytes: Vec<u8>) -> PipelineResult<DynamicImage> {
        if bytes.is_empty() {
            return Err(PipelineError::InvalidInput("Image data is empty".to_string()));
        }

        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);
        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || decode_bytes_sync(bytes)).await
        })
        .await;

        let image = match decode_result {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => {
                return Err(PipelineError::Decode {
                    message: format!("Task join error: {}", e),
                })
            }
            Err(_) => {
                return Err(PipelineError::Timeout {
                    stage: "decode".to_string(),
                    timeout_ms: self.limits.decode_timeout_ms,
                })
            }
        };

        let (width, height) = image.dimensions();
        let max_dim = self.limits.max_image_dimension;
        if width > max_dim || height > max_dim {
            return Err(PipelineError::ImageTooLarge {
                width,
                height,
                max_dim,
            });
        }

        tracing::debug!("Decoded image {}x{}", width, height);
        Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
    }

    /// Decode base64 image text, with or without a `data:` URI prefix.
    pub async fn decode_base64(&self, encoded: &str) -> PipelineResult<DynamicImage> {
        let bytes = decode_base64_image(encoded)?;
        self.decode_from_bytes(bytes).await
    }
}

/// Synchronous decode from bytes (runs in spawn_blocking).
fn decode_bytes_sync(bytes: Vec<u8>) -> PipelineResult<DynamicImage> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PipelineError::Decode {
            message: format!("Cannot detect image format: {}", e),
        })?;
    if reader.format().is_none() {
        return Err(PipelineError::Decode {
            message: "Unrecognized image format".to_string(),
        });
    }
    reader.decode().map_err(|e| PipelineError::Decode {
        message: e.to_string(),
    })
}

/// Drop a `data:<mime>;base64,` prefix if present.
///
/// Only text starting with `data:` is treated as a URI; everything up to and
/// including its first comma is the prefix.
pub fn strip_data_uri(encoded: &str) -> &str {
    if !encoded.starts_with("data:") {
        return encoded;
    }
    match encoded.split_once(',') {
        Some((_, payload)) => payload,
        None => encoded,
    }
}

/// Decode base64 image text into raw bytes.
pub fn decode_base64_image(encoded: &str) -> PipelineResult<Vec<u8>> {
    let payload: String = strip_data_uri(encoded.trim())
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if payload.is_empty() {
        return Err(PipelineError::InvalidInput(
            "image_base64 is empty".to_string(),
        ));
    }
    BASE64.decode(payload).map_err(|e| PipelineError::Decode {
        message: format!("Invalid base64 image data: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 30, 30]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn decoder() -> ImageDecoder {
        ImageDecoder::new(LimitsConfig::default())
    }

    #[test]
    fn test_strip_data_uri() {
        assert_eq!(strip_data_uri("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_uri("AAAA"), "AAAA");
        assert_eq!(strip_data_uri("AA,AA"), "AA,AA");
    }

    #[test]
    fn test_decode_base64_with_and_without_prefix() {
        let bytes = png_bytes(4, 4);
        let encoded = BASE64.encode(&bytes);

        assert_eq!(decode_base64_image(&encoded).unwrap(), bytes);
        let uri = format!("data:image/png;base64,{}", encoded);
        assert_eq!(decode_base64_image(&uri).unwrap(), bytes);
    }

    #[test]
    fn test_decode_base64_rejects_garbage() {
        let err = decode_base64_image("not base64 at all!!").unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
        assert!(err.is_client_error());

        let err = decode_base64_image("data:image/png;base64,").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_decode_png_bytes() {
        let image = decoder().decode_from_bytes(png_bytes(8, 6)).await.unwrap();
        assert_eq!(image.dimensions(), (8, 6));
    }

    #[tokio::test]
    async fn test_decode_converts_to_rgb() {
        let img = RgbaImage::from_pixel(3, 3, image::Rgba([1, 2, 3, 128]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();

        let image = decoder().decode_from_bytes(buf.into_inner()).await.unwrap();
        assert!(matches!(image, DynamicImage::ImageRgb8(_)));
    }

    #[tokio::test]
    async fn test_decode_rejects_non_image_bytes() {
        let err = decoder()
            .decode_from_bytes(b"plain text, not pixels".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_decode_rejects_empty_bytes() {
        let err = decoder().decode_from_bytes(Vec::new()).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_decode_enforces_dimension_limit() {
        let decoder = ImageDecoder::new(LimitsConfig {
            max_image_dimension: 16,
            ..LimitsConfig::default()
        });
        let err = decoder.decode_from_bytes(png_bytes(32, 8)).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ImageTooLarge {
                width: 32,
                height: 8,
                max_dim: 16
            }
        ));
    }

    #[tokio::test]
    async fn test_decode_base64_end_to_end() {
        let encoded = format!("data:image/png;base64,{}", BASE64.encode(png_bytes(5, 5)));
        let image = decoder().decode_base64(&encoded).await.unwrap();
        assert_eq!(image.dimensions(), (5, 5));
    }
}
