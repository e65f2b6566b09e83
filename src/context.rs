//! Explicit codec configuration: the secret key and QIM step as an owned
//! value rather than process-wide state.
//!
//! `CodecContext` is constructed once by the caller and passed by reference
//! into every codec entry point.

/// Default quantization step. Empirically robust for JPEG quality >= 60.
pub const DEFAULT_QIM_STEP: f32 = 40.0;

/// Bundles the secret key, QIM step, and strict-mode flag every codec call needs.
///
/// `strict` governs how the payload's reserved byte and upper flag bits are
/// treated on read: when `true`, nonzero reserved bits make `deserialize`
/// fail; the default (`false`) ignores them on read (write always zeroes them).
#[derive(Debug, Clone)]
pub struct CodecContext {
    key: Vec<u8>,
    qim_step: f32,
    strict: bool,
}

impl CodecContext {
    /// Build a context from a secret key and QIM step. Callers should supply
    /// at least 16 bytes of key entropy; the key controls block *position*,
    /// not payload secrecy.
    pub fn new(key: impl Into<Vec<u8>>, qim_step: f32) -> Self {
        Self { key: key.into(), qim_step, strict: false }
    }

    /// Construct with the default QIM step (40.0).
    pub fn with_default_step(key: impl Into<Vec<u8>>) -> Self {
        Self::new(key, DEFAULT_QIM_STEP)
    }

    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[inline] pub fn key(&self) -> &[u8] { &self.key }
    #[inline] pub fn qim_step(&self) -> f32 { self.qim_step }
    #[inline] pub fn strict(&self) -> bool { self.strict }
}
