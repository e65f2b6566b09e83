//! Error taxonomy — one top-level enum with `#[from]` conversions from every
//! module's own error type.
//!
//! Propagation policy: every variant carries the failing UID or
//! scale when relevant, never raw pixel data.

use thiserror::Error;

use crate::payload::PayloadError;

#[derive(Error, Debug)]
pub enum WatermarkError {
    /// Input-shape error: image smaller than the 128x128 floor.
    #[error("image is smaller than the minimum working size (128x128)")]
    TooSmall,

    /// `generate_distribution` was called on an image whose extracted
    /// payload is missing, invalid, or not a master (`current_uid != 0`).
    #[error("input is not a valid master (missing, invalid, or already distributed payload)")]
    NotAMaster,

    /// DRM state D: actor is not the owner and `allow_derivative` is unset.
    /// The original pixels are never altered when this is returned.
    #[error("actor {actor_uid} is not the owner and derivatives are forbidden")]
    DerivativeForbidden { actor_uid: u128 },

    /// Every rescale attempt in the multi-scale extractor produced an
    /// invalid decode. Not a decode *exception* in the audit path (there the
    /// verdict is reported instead), but callers that demand a payload use
    /// this to fail.
    #[error("no valid payload decoded at any scale (best confidence {confidence:.3})")]
    DecodeFailed { confidence: f32 },

    /// Fewer than the required redundant blocks survived key intersection
    /// with the variance-ranked safety buffer. Indicates a programming
    /// error (undersized safety buffer, mis-seeded key schedule), not a
    /// data condition — the caller should abort rather than retry.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Payload(#[from] PayloadError),
}
