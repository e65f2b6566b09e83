//! Multi-scale extractor — when a direct extraction at native
//! resolution yields an invalid payload, retry at several rescaled widths
//! and keep the highest-confidence valid decode.
//!
//! Tries the native resolution first, then iterates candidate rescaled
//! widths, keeping the best-confidence result — a pure function rather than
//! a stateful retry loop.

use image::imageops::{self, FilterType};

use crate::context::CodecContext;
use crate::orchestration::{extract_payload, ExtractOutcome};
use crate::payload::DeserializeError;
use crate::pixel::PixelBuffer;

/// Target widths tried in order when the native decode is invalid. Height
/// is scaled proportionally; resampling uses Lanczos3, the closest filter
/// the `image` crate exposes to a 4-lobe Lanczos kernel (see DESIGN.md).
pub const CANDIDATE_WIDTHS: [u32; 5] = [512, 768, 1024, 1280, 2048];

#[derive(Debug, Clone)]
pub struct ScaledExtraction {
    pub outcome: ExtractOutcome,
    pub scale_used: u32,
}

fn resize_to_width(image: &PixelBuffer, width: u32) -> PixelBuffer {
    let height = ((image.height() as u64 * width as u64) / (image.width().max(1) as u64)).max(1) as u32;
    let rgb_image = image.to_rgb_image();
    let resized = imageops::resize(&rgb_image, width, height, FilterType::Lanczos3);
    PixelBuffer::from_rgb_image(&resized)
}

fn consider(
    outcome: ExtractOutcome,
    scale_used: u32,
    best_valid: &mut Option<ScaledExtraction>,
    best_invalid: &mut Option<ScaledExtraction>,
) {
    if outcome.payload.is_ok() {
        let better = best_valid.as_ref().map_or(true, |b| outcome.confidence > b.outcome.confidence);
        if better {
            *best_valid = Some(ScaledExtraction { outcome, scale_used });
        }
    } else {
        let better = best_invalid.as_ref().map_or(true, |b| outcome.confidence > b.outcome.confidence);
        if better {
            *best_invalid = Some(ScaledExtraction { outcome, scale_used });
        }
    }
}

/// Native attempt first, then (only if it was not valid) each candidate
/// width, returning the best valid decode or — if none validated — the
/// best-confidence invalid one.
pub fn extract_best(ctx: &CodecContext, image: &PixelBuffer) -> ScaledExtraction {
    let mut best_valid: Option<ScaledExtraction> = None;
    let mut best_invalid: Option<ScaledExtraction> = None;

    if let Ok(outcome) = extract_payload(ctx, image) {
        consider(outcome, image.width(), &mut best_valid, &mut best_invalid);
    }

    if best_valid.is_none() && image.width() > 0 {
        for &width in CANDIDATE_WIDTHS.iter() {
            let resized = resize_to_width(image, width);
            if let Ok(outcome) = extract_payload(ctx, &resized) {
                consider(outcome, width, &mut best_valid, &mut best_invalid);
            }
        }
    }

    best_valid.or(best_invalid).unwrap_or_else(|| ScaledExtraction {
        outcome: ExtractOutcome { payload: Err(DeserializeError::BadLength(0)), confidence: 0.0 },
        scale_used: image.width(),
    })
}
