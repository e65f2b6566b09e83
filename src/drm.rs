//! DRM state machine — decides what payload (if any) an
//! `actor`'s image operation should carry.
//!
//! `DrmDecision` is a closed enum dispatched with a single `match`.

use crate::error::WatermarkError;
use crate::payload::PayloadRecord;

/// Outcome of running the state machine. `Reject` carries the error the
/// caller should propagate; the other three variants carry the payload the
/// caller should embed.
#[derive(Debug)]
pub enum DrmDecision {
    /// State A: no existing payload (absent or invalid) -> fresh master.
    CreateMaster(PayloadRecord),
    /// State B: actor already owns the extracted payload -> re-master.
    UpdateMaster(PayloadRecord),
    /// State C: different owner, but derivatives are allowed -> new master
    /// under the acting UID.
    ForkMaster(PayloadRecord),
    /// State D: different owner, derivatives forbidden. Pixels must never
    /// be produced for this case.
    Reject(WatermarkError),
}

impl PartialEq for DrmDecision {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DrmDecision::CreateMaster(a), DrmDecision::CreateMaster(b)) => a == b,
            (DrmDecision::UpdateMaster(a), DrmDecision::UpdateMaster(b)) => a == b,
            (DrmDecision::ForkMaster(a), DrmDecision::ForkMaster(b)) => a == b,
            (DrmDecision::Reject(a), DrmDecision::Reject(b)) => format!("{a:?}") == format!("{b:?}"),
            _ => false,
        }
    }
}
impl Eq for DrmDecision {}

/// Pure function of `(actor_uid, actor_flags, extracted)`. Exhaustively
/// covers the four ownership states: create, update, fork, and reject.
pub fn decide(actor_uid: u128, actor_flags: u8, extracted: Option<PayloadRecord>) -> DrmDecision {
    let fresh = match PayloadRecord::new(actor_uid, 0, actor_flags) {
        Ok(rec) => rec,
        Err(e) => return DrmDecision::Reject(e.into()),
    };

    match extracted {
        None => DrmDecision::CreateMaster(fresh),
        Some(rec) if rec.original_uid == actor_uid => DrmDecision::UpdateMaster(fresh),
        Some(rec) if rec.allow_derivative() => DrmDecision::ForkMaster(fresh),
        Some(_) => DrmDecision::Reject(WatermarkError::DerivativeForbidden { actor_uid }),
    }
}
