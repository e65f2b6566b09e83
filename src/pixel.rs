//! Owned pixel buffer — the boundary type between this crate's pure transform
//! math and the `image` crate.
//!
//! The DWT/DCT/QIM pipeline never sees an `image::DynamicImage` directly;
//! `PixelBuffer` keeps the core signatures free of image-crate types. Fields
//! are private so the only way to construct one from raw parts is the
//! validated [`PixelBuffer::new`]: a caller-supplied `(width, height, rgb)`
//! whose lengths disagree fails here, at the API boundary, rather than
//! surfacing as a panic deep inside `to_rgb_image` the first time some
//! downstream stage resamples or encodes the buffer.

use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelBufferError {
    #[error("rgb buffer length {actual} does not match {width}x{height}x3 ({expected})")]
    LengthMismatch { width: u32, height: u32, expected: usize, actual: usize },
}

/// RGB, 8 bits per channel, row-major, 3 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

impl PixelBuffer {
    /// Validates `rgb.len() == width * height * 3` before constructing.
    pub fn new(width: u32, height: u32, rgb: Vec<u8>) -> Result<Self, PixelBufferError> {
        let expected = (width as usize) * (height as usize) * 3;
        if rgb.len() != expected {
            return Err(PixelBufferError::LengthMismatch { width, height, expected, actual: rgb.len() });
        }
        Ok(Self { width, height, rgb })
    }

    /// Construct without the length check, for call sites that derive
    /// `rgb`'s length from `width`/`height` themselves (a freshly allocated
    /// buffer sized to match, or bytes already validated by the `image`
    /// crate's own `RgbImage` invariant).
    pub(crate) fn new_unchecked(width: u32, height: u32, rgb: Vec<u8>) -> Self {
        debug_assert_eq!(rgb.len(), (width as usize) * (height as usize) * 3);
        Self { width, height, rgb }
    }

    pub fn from_rgb_image(img: &RgbImage) -> Self {
        Self::new_unchecked(img.width(), img.height(), img.as_raw().clone())
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_raw(self.width, self.height, self.rgb.clone())
            .expect("PixelBuffer invariant: width*height*3 == rgb.len(), enforced at construction")
    }

    #[inline] pub fn width(&self) -> u32 { self.width }
    #[inline] pub fn height(&self) -> u32 { self.height }
    #[inline] pub fn rgb(&self) -> &[u8] { &self.rgb }

    #[inline]
    pub fn meets_minimum_size(&self) -> bool {
        self.width >= 128 && self.height >= 128
    }
}
