//! # sgp-watermark — DWT/DCT/QIM image watermarking codec
//!
//! Embeds and extracts a fixed 32-byte payload in a raster image's luma
//! channel such that it survives lossy re-encoding (JPEG quality >= 60),
//! moderate rescaling, and social-media-style transport, while staying
//! visually imperceptible. A secondary DRM layer tracks ownership: every
//! image derives from a *master* (payload carries the owner UID and a null
//! current-holder) and every *distribution copy* carries the same owner UID
//! plus a concrete recipient UID.
//!
//! Guarantees:
//! - The codec is a pure function of its inputs: same pixels + key + step +
//!   payload in, bit-identical pixels out (see `orchestration`).
//! - The secret key controls block *position*, never payload secrecy —
//!   this is not a cryptographic protocol.
//! - Only the luma (Y) channel is touched; Cr/Cb pass through untouched.
//! - The block-selection order is a pure function of `(key, width, height)`
//!   (`block_index`) — embedding and extraction agree on it with nothing
//!   persisted between calls.
//! - `CodecContext` replaces any global/process-wide key configuration: it
//!   is constructed once by the caller and passed by reference into every
//!   entry point.

pub mod block_index;
pub mod context;
pub mod drm;
pub mod error;
pub mod multiscale;
pub mod orchestration;
pub mod payload;
pub mod pixel;
pub mod qim;
pub mod redundancy;
pub mod transform;

// Flat re-exports for the most common types.
pub use context::CodecContext;
pub use drm::DrmDecision;
pub use error::WatermarkError;
pub use orchestration::{
    audit, create_master, generate_distribution, require_payload, AuditRecord, ExtractOutcome, Verdict,
};
pub use payload::{DeserializeError, PayloadError, PayloadRecord};
pub use pixel::{PixelBuffer, PixelBufferError};
