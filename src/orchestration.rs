//! Orchestration — composes the lower-level codec stages into the two
//! public mutating operations and the one read-only audit operation.
//!
//! Kept as free functions over `&CodecContext` and owned pixel buffers
//! rather than a stateful handle — there is no open file handle or mode
//! that needs to persist across calls here.

use serde::{Deserialize, Serialize};

use crate::block_index;
use crate::context::CodecContext;
use crate::drm::{self, DrmDecision};
use crate::error::WatermarkError;
use crate::multiscale;
use crate::payload::{bits_to_bytes, DeserializeError, PayloadRecord};
use crate::pixel::PixelBuffer;
use crate::qim;
use crate::redundancy;
use crate::transform::{color, dct, dwt};

/// Result of a single-scale extraction attempt: the decode outcome (valid
/// payload or the sub-reason it failed validation) plus the voting
/// confidence that produced it. Decode failure is a normal outcome here,
/// not an exception — only `TooSmall`/`InvariantViolation`
/// surface as `Err`.
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    pub payload: Result<PayloadRecord, DeserializeError>,
    pub confidence: f32,
}

/// Embed `payload` into `image` at native resolution.
///
/// Data flow: RGB -> YCrCb -> Y -> Haar DWT -> HL subband -> 8x8 DCT tiles
/// -> QIM on the fixed (4,3) coefficient -> inverse DCT -> inverse DWT ->
/// recombine with Cr/Cb -> RGB.
pub fn embed_payload(
    ctx: &CodecContext,
    image: &PixelBuffer,
    payload: &PayloadRecord,
) -> Result<PixelBuffer, WatermarkError> {
    if !image.meets_minimum_size() {
        return Err(WatermarkError::TooSmall);
    }

    let bits = payload.to_bits()?;
    let padded = pad_to_even(image);

    let plane = color::rgb_to_ycrcb(&padded);
    let sb = dwt::haar_forward(&plane.y, padded.width(), padded.height());

    let variances = redundancy::compute_variances(&sb.hl, sb.sub_width, sb.sub_height);
    let key_order = block_index::block_order(ctx.key(), sb.sub_width, sb.sub_height);
    let selected = redundancy::select_blocks(variances, &key_order)?;
    let assignments = redundancy::assign_bits(&selected);

    let (u, v) = qim::TARGET_COEFF;
    let mut hl = sb.hl.clone();
    for (coord, bit_index) in assignments {
        let tile = dct::read_tile(&hl, sb.sub_width, coord.0, coord.1);
        let mut coeffs = dct::dct8x8(&tile);
        coeffs[u][v] = qim::embed_bit(coeffs[u][v], bits[bit_index], ctx.qim_step());
        let spatial = dct::idct8x8(&coeffs);
        dct::write_tile(&mut hl, sb.sub_width, coord.0, coord.1, &spatial);
    }

    let modulated = dwt::Subbands { ll: sb.ll, lh: sb.lh, hl, hh: sb.hh, sub_width: sb.sub_width, sub_height: sb.sub_height };
    let y_out = dwt::haar_inverse(&modulated);
    let plane_out = color::YCrCbPlane { y: y_out, cr: plane.cr, cb: plane.cb, width: padded.width(), height: padded.height() };
    let rgb_out = color::ycrcb_to_rgb(&plane_out);

    Ok(crop_to(&rgb_out, image.width(), image.height()))
}

/// Extract whatever payload is recoverable from `image` at native
/// resolution, with the voting confidence that produced it.
pub fn extract_payload(ctx: &CodecContext, image: &PixelBuffer) -> Result<ExtractOutcome, WatermarkError> {
    if !image.meets_minimum_size() {
        return Err(WatermarkError::TooSmall);
    }

    let padded = pad_to_even(image);
    let plane = color::rgb_to_ycrcb(&padded);
    let sb = dwt::haar_forward(&plane.y, padded.width(), padded.height());

    let variances = redundancy::compute_variances(&sb.hl, sb.sub_width, sb.sub_height);
    let key_order = block_index::block_order(ctx.key(), sb.sub_width, sb.sub_height);
    let selected = redundancy::select_blocks(variances, &key_order)?;
    let assignments = redundancy::assign_bits(&selected);

    let (u, v) = qim::TARGET_COEFF;
    let mut samples = vec![Vec::with_capacity(redundancy::REDUNDANCY); redundancy::PAYLOAD_BITS];
    for (coord, bit_index) in assignments {
        let tile = dct::read_tile(&sb.hl, sb.sub_width, coord.0, coord.1);
        let coeffs = dct::dct8x8(&tile);
        let bit = qim::extract_bit(coeffs[u][v], ctx.qim_step());
        samples[bit_index].push(bit);
    }

    let (bits, confidence) = redundancy::vote(&samples)?;
    let bytes = bits_to_bytes(&bits);
    let payload = PayloadRecord::deserialize(&bytes, ctx.strict());

    Ok(ExtractOutcome { payload, confidence })
}

/// Create, re-master, or fork a master from `image` per the DRM state
/// machine. Pixels are never produced on `Reject`.
pub fn create_master(
    ctx: &CodecContext,
    image: &PixelBuffer,
    actor_uid: u128,
    actor_flags: u8,
) -> Result<PixelBuffer, WatermarkError> {
    let existing = extract_payload(ctx, image)?.payload.ok();

    match drm::decide(actor_uid, actor_flags, existing) {
        DrmDecision::CreateMaster(payload)
        | DrmDecision::UpdateMaster(payload)
        | DrmDecision::ForkMaster(payload) => embed_payload(ctx, image, &payload),
        DrmDecision::Reject(err) => Err(err),
    }
}

/// Re-embed the master's payload with `current_uid` replaced by
/// `recipient_uid`, writing into the original master pixels (never into an
/// extracted reconstruction). Distribution never invokes the DRM state
/// machine — it is a distinct operation.
pub fn generate_distribution(
    ctx: &CodecContext,
    master_image: &PixelBuffer,
    recipient_uid: u128,
) -> Result<PixelBuffer, WatermarkError> {
    let outcome = extract_payload(ctx, master_image)?;
    let master = outcome.payload.map_err(|_| WatermarkError::NotAMaster)?;
    if !master.is_master() {
        return Err(WatermarkError::NotAMaster);
    }

    let distribution = PayloadRecord::new(master.original_uid, recipient_uid, master.flags)?;
    embed_payload(ctx, master_image, &distribution)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Watermarked,
    NoWatermark,
}

/// Output of [`audit`]: a lookup, never a mutation. Absence of a payload is
/// a normal outcome, reported as `Verdict::NoWatermark` rather
/// than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub verdict: Verdict,
    pub original_uid: Option<u128>,
    pub current_uid: Option<u128>,
    pub allow_derivative: bool,
    pub allow_reprint: bool,
    pub confidence: f32,
    pub scale_used: u32,
}

/// Run the multi-scale extractor and report the best decode.
pub fn audit(ctx: &CodecContext, image: &PixelBuffer) -> AuditRecord {
    let best = multiscale::extract_best(ctx, image);
    match best.outcome.payload {
        Ok(rec) => AuditRecord {
            verdict: Verdict::Watermarked,
            original_uid: Some(rec.original_uid),
            current_uid: Some(rec.current_uid),
            allow_derivative: rec.allow_derivative(),
            allow_reprint: rec.allow_reprint(),
            confidence: best.outcome.confidence,
            scale_used: best.scale_used,
        },
        Err(_) => AuditRecord {
            verdict: Verdict::NoWatermark,
            original_uid: None,
            current_uid: None,
            allow_derivative: false,
            allow_reprint: false,
            confidence: best.outcome.confidence,
            scale_used: best.scale_used,
        },
    }
}

/// Convenience wrapper over [`audit`] for callers that want a hard failure
/// instead of a `Verdict::NoWatermark` record. `audit` itself never raises
/// `DecodeFailed`, since a lookup finding nothing is a normal outcome there —
/// this is for callers outside the audit path who need a `Result`.
pub fn require_payload(ctx: &CodecContext, image: &PixelBuffer) -> Result<AuditRecord, WatermarkError> {
    let record = audit(ctx, image);
    match record.verdict {
        Verdict::Watermarked => Ok(record),
        Verdict::NoWatermark => Err(WatermarkError::DecodeFailed { confidence: record.confidence }),
    }
}

/// Pad odd width/height by replicating the last row/column so the Haar DWT
/// always sees even dimensions. `crop_to` undoes this after the inverse
/// transform so the caller-visible dimensions never change: the output
/// pixel buffer always matches the input's dimensions.
fn pad_to_even(image: &PixelBuffer) -> PixelBuffer {
    let pad_w = image.width() % 2;
    let pad_h = image.height() % 2;
    if pad_w == 0 && pad_h == 0 {
        return image.clone();
    }

    let new_width = image.width() + pad_w;
    let new_height = image.height() + pad_h;
    let mut rgb = vec![0u8; (new_width as usize) * (new_height as usize) * 3];

    for y in 0..new_height {
        let src_y = y.min(image.height() - 1);
        for x in 0..new_width {
            let src_x = x.min(image.width() - 1);
            let src = ((src_y * image.width() + src_x) * 3) as usize;
            let dst = ((y * new_width + x) * 3) as usize;
            rgb[dst..dst + 3].copy_from_slice(&image.rgb()[src..src + 3]);
        }
    }

    PixelBuffer::new_unchecked(new_width, new_height, rgb)
}

fn crop_to(padded: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    if padded.width() == width && padded.height() == height {
        return padded.clone();
    }

    let mut rgb = vec![0u8; (width as usize) * (height as usize) * 3];
    for y in 0..height {
        let src = ((y * padded.width()) * 3) as usize;
        let dst = ((y * width) * 3) as usize;
        rgb[dst..dst + (width as usize) * 3].copy_from_slice(&padded.rgb()[src..src + (width as usize) * 3]);
    }

    PixelBuffer::new_unchecked(width, height, rgb)
}
