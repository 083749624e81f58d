//! Size-targeting JPEG encoder.
//!
//! Given the raw bytes of any decodable raster image and a target size in
//! kilobytes, [`compress_to_target`] decodes once and then re-encodes the
//! pixel buffer as JPEG at decreasing quality until the encoded output fits
//! under the target — or quality is exhausted, in which case the last encode
//! is returned as-is and the caller must expect a size above target.
//!
//! The encoder is a pure in-memory transform: it never touches the
//! filesystem. Reading the source and writing the result belong to the
//! caller (see [`batch`](crate::batch)).
//!
//! ## Encode loop
//!
//! The loop is do-while shaped: the image is always encoded at least once,
//! at the initial quality, even when the input already fits under the
//! target. The stopping check runs against the freshly *encoded* size, not
//! the input byte length, so an oversized source that happens to fit after
//! one pass at quality 90 stops right there.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageReader};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("JPEG encode failed: {0}")]
    Encode(String),
}

/// Quality setting for lossy JPEG encoding (1-100). Clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Tuning knobs for the encode loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    /// Quality of the first encode pass.
    pub initial_quality: Quality,
    /// Fixed quality decrement between passes. Treated as at least 1.
    pub step: u32,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            initial_quality: Quality::default(),
            step: 5,
        }
    }
}

/// Result of a successful compression call.
///
/// `size_kb` may still exceed the requested target when quality ran out —
/// that is an accepted terminal condition, not an error.
#[derive(Debug, Clone)]
pub struct CompressOutcome {
    /// JPEG bytes of the last encode pass.
    pub bytes: Vec<u8>,
    /// `bytes.len()` in kilobytes.
    pub size_kb: f64,
    /// Quality the returned bytes were encoded at.
    pub quality: u32,
}

/// Re-encode `input` as JPEG, stepping quality down until the output is at
/// or below `target_kb` kilobytes.
///
/// The input can be any raster format with a compiled-in decoder (JPEG, PNG,
/// TIFF, WebP); the output is always JPEG. Alpha channels are dropped by the
/// RGB conversion.
pub fn compress_to_target(
    input: &[u8],
    target_kb: u32,
    options: &CompressOptions,
) -> Result<CompressOutcome, EncodeError> {
    let img = ImageReader::new(Cursor::new(input))
        .with_guessed_format()
        .map_err(|e| EncodeError::Decode(format!("unrecognized image data: {e}")))?
        .decode()
        .map_err(|e| EncodeError::Decode(e.to_string()))?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let step = options.step.max(1) as i32;
    let mut quality = options.initial_quality.value() as i32;

    loop {
        let bytes = encode_jpeg(rgb.as_raw(), width, height, quality as u8)?;
        let size_kb = bytes.len() as f64 / 1024.0;
        let next = quality - step;
        if size_kb <= f64::from(target_kb) || next <= 0 {
            return Ok(CompressOutcome {
                bytes,
                size_kb,
                quality: quality as u32,
            });
        }
        quality = next;
    }
}

/// Encode an RGB8 pixel buffer as JPEG at the given quality.
fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::Encode(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, RgbImage};

    /// Encode a smooth gradient image as JPEG — compresses well.
    fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        encode_jpeg(img.as_raw(), width, height, 95).unwrap()
    }

    /// Encode a deterministic noise image as JPEG — compresses poorly, so
    /// small targets are unreachable at any quality.
    fn noise_jpeg(width: u32, height: u32) -> Vec<u8> {
        let mut state: u32 = 0x12345678;
        let img = RgbImage::from_fn(width, height, |_, _| {
            // Xorshift keeps the fixture deterministic across runs.
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            image::Rgb([state as u8, (state >> 8) as u8, (state >> 16) as u8])
        });
        encode_jpeg(img.as_raw(), width, height, 95).unwrap()
    }

    #[test]
    fn small_input_encodes_once_at_initial_quality() {
        let input = gradient_jpeg(64, 64);
        let outcome = compress_to_target(&input, 500, &CompressOptions::default()).unwrap();

        // Generous target: the first pass already fits, quality untouched.
        assert_eq!(outcome.quality, 90);
        assert!(outcome.size_kb <= 500.0);
        assert!(!outcome.bytes.is_empty());
    }

    #[test]
    fn unreachable_target_exhausts_quality_and_terminates() {
        let input = noise_jpeg(256, 256);
        let outcome = compress_to_target(&input, 1, &CompressOptions::default()).unwrap();

        // 90, 85, ..., 5 — the pass after 5 would be 0, so the loop stops
        // and hands back the quality-5 encode even though it's over target.
        assert_eq!(outcome.quality, 5);
        assert!(outcome.size_kb > 1.0);
    }

    #[test]
    fn zero_step_is_treated_as_one() {
        let input = gradient_jpeg(16, 16);
        let options = CompressOptions {
            step: 0,
            ..CompressOptions::default()
        };
        // Target 0 KB is unreachable, so this only returns if the loop
        // still steps down and bottoms out.
        let outcome = compress_to_target(&input, 0, &options).unwrap();
        assert_eq!(outcome.quality, 1);
    }

    #[test]
    fn fixed_input_produces_byte_identical_output() {
        let input = noise_jpeg(128, 128);
        let options = CompressOptions::default();

        let first = compress_to_target(&input, 50, &options).unwrap();
        let second = compress_to_target(&input, 50, &options).unwrap();
        assert_eq!(first.bytes, second.bytes);
        assert_eq!(first.quality, second.quality);
    }

    #[test]
    fn recompressing_a_fitting_output_is_stable_in_quality() {
        let input = noise_jpeg(128, 128);
        let options = CompressOptions::default();

        let first = compress_to_target(&input, 60, &options).unwrap();
        assert!(first.size_kb <= 60.0);

        // Already under target: a second run stops after one pass at the
        // initial quality and stays under target.
        let second = compress_to_target(&first.bytes, 60, &options).unwrap();
        assert_eq!(second.quality, 90);
        assert!(second.size_kb <= 60.0);
    }

    #[test]
    fn corrupt_input_is_a_decode_error() {
        let result = compress_to_target(b"definitely not an image", 50, &CompressOptions::default());
        assert!(matches!(result, Err(EncodeError::Decode(_))));
    }

    #[test]
    fn truncated_jpeg_is_a_decode_error() {
        let mut input = gradient_jpeg(64, 64);
        input.truncate(20);
        let result = compress_to_target(&input, 50, &CompressOptions::default());
        assert!(matches!(result, Err(EncodeError::Decode(_))));
    }

    #[test]
    fn png_input_is_encoded_as_jpeg() {
        let img = RgbImage::from_fn(48, 48, |x, y| image::Rgb([x as u8, y as u8, 0]));
        let mut png = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png)
            .write_image(img.as_raw(), 48, 48, ExtendedColorType::Rgb8)
            .unwrap();

        let outcome = compress_to_target(&png, 500, &CompressOptions::default()).unwrap();
        // JPEG SOI marker
        assert_eq!(&outcome.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn size_kb_matches_byte_length() {
        let input = gradient_jpeg(64, 64);
        let outcome = compress_to_target(&input, 500, &CompressOptions::default()).unwrap();
        assert_eq!(outcome.size_kb, outcome.bytes.len() as f64 / 1024.0);
    }

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn default_options() {
        let options = CompressOptions::default();
        assert_eq!(options.initial_quality.value(), 90);
        assert_eq!(options.step, 5);
    }
}
