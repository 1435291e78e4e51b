// SPDX-License-Identifier: GPL-3.0-only

//! Async photo encoding
//!
//! Converts an RGBA session frame into JPEG or PNG bytes. Encoding is
//! CPU-bound and runs on the blocking pool so capture callers never stall.

use crate::backends::camera::types::CameraFrame;
use crate::errors::PhotoError;
use image::{RgbImage, RgbaImage};
use std::sync::Arc;
use tracing::{debug, info};

/// Container of a saved photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingFormat {
    #[default]
    Jpeg,
    Png,
}

impl EncodingFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "jpg",
            EncodingFormat::Png => "png",
        }
    }
}

impl From<crate::config::PhotoOutputFormat> for EncodingFormat {
    fn from(format: crate::config::PhotoOutputFormat) -> Self {
        match format {
            crate::config::PhotoOutputFormat::Jpeg => EncodingFormat::Jpeg,
            crate::config::PhotoOutputFormat::Png => EncodingFormat::Png,
        }
    }
}

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    #[default]
    High,
    /// Maximum quality (minimal compression)
    Maximum,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Low => 60,
            EncodingQuality::Medium => 80,
            EncodingQuality::High => 92,
            EncodingQuality::Maximum => 98,
        }
    }
}

/// Encoded image data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
}

/// Photo encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoEncoder {
    format: EncodingFormat,
    quality: EncodingQuality,
}

impl PhotoEncoder {
    pub fn new(format: EncodingFormat, quality: EncodingQuality) -> Self {
        Self { format, quality }
    }

    /// Encode a frame on the blocking pool
    pub async fn encode(&self, frame: Arc<CameraFrame>) -> Result<EncodedImage, PhotoError> {
        info!(
            width = frame.width,
            height = frame.height,
            format = ?self.format,
            "Starting encoding"
        );

        let encoder = *self;
        tokio::task::spawn_blocking(move || encoder.encode_frame(&frame)).await?
    }

    /// Encode a frame on the current thread
    pub fn encode_frame(&self, frame: &CameraFrame) -> Result<EncodedImage, PhotoError> {
        let rgba = RgbaImage::from_raw(frame.width, frame.height, frame.packed_rgba())
            .ok_or_else(|| {
                PhotoError::EncodingFailed(format!(
                    "frame buffer too small for {}x{}",
                    frame.width, frame.height
                ))
            })?;
        let rgb: RgbImage = image::DynamicImage::ImageRgba8(rgba).into_rgb8();

        let data = match self.format {
            EncodingFormat::Jpeg => encode_jpeg(&rgb, self.quality)?,
            EncodingFormat::Png => encode_png(&rgb)?,
        };
        debug!(size = data.len(), format = ?self.format, "Encoding complete");

        Ok(EncodedImage {
            data,
            format: self.format,
            width: rgb.width(),
            height: rgb.height(),
        })
    }
}

fn encode_jpeg(image: &RgbImage, quality: EncodingQuality) -> Result<Vec<u8>, PhotoError> {
    let mut buffer = Vec::new();
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.jpeg_quality());

    encoder.encode(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgb8,
    )?;

    Ok(buffer)
}

fn encode_png(image: &RgbImage) -> Result<Vec<u8>, PhotoError> {
    let mut buffer = Vec::new();
    image.write_to(
        &mut std::io::Cursor::new(&mut buffer),
        image::ImageFormat::Png,
    )?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn gray_frame(width: u32, height: u32) -> CameraFrame {
        CameraFrame {
            width,
            height,
            data: Arc::from(vec![128u8; (width * height * 4) as usize]),
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn test_format_extensions() {
        assert_eq!(EncodingFormat::Jpeg.extension(), "jpg");
        assert_eq!(EncodingFormat::Png.extension(), "png");
    }

    #[test]
    fn test_default_settings_encode_high_quality_jpeg() {
        let encoder = PhotoEncoder::default();
        assert_eq!(encoder.format, EncodingFormat::Jpeg);
        assert_eq!(encoder.quality, EncodingQuality::High);
        assert!(EncodingQuality::Medium.jpeg_quality() < EncodingQuality::High.jpeg_quality());
    }

    #[test]
    fn test_encode_jpeg_frame() {
        let encoded = PhotoEncoder::default().encode_frame(&gray_frame(8, 4)).unwrap();
        assert_eq!(encoded.format, EncodingFormat::Jpeg);
        assert_eq!((encoded.width, encoded.height), (8, 4));
        assert_eq!(&encoded.data[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_png_frame() {
        let encoder = PhotoEncoder::new(EncodingFormat::Png, EncodingQuality::High);
        let encoded = encoder.encode_frame(&gray_frame(4, 4)).unwrap();
        assert_eq!(&encoded.data[1..4], b"PNG");
    }

    #[test]
    fn test_short_buffer_is_an_error() {
        let mut frame = gray_frame(4, 4);
        frame.data = Arc::from(vec![0u8; 8]);
        let result = PhotoEncoder::default().encode_frame(&frame);
        assert!(matches!(result, Err(PhotoError::EncodingFailed(_))));
    }

    #[tokio::test]
    async fn test_async_encode() {
        let encoded = PhotoEncoder::default()
            .encode(Arc::new(gray_frame(2, 2)))
            .await
            .unwrap();
        assert!(!encoded.data.is_empty());
    }
}
