//! QIM modulator — embed one bit by quantizing a coefficient to
//! the nearest lattice point of the correct parity; extract by nearest-
//! lattice decoding, with nearest-correct-parity rounding and sign-aware
//! tie-breaking on the lattice boundary.

/// Coefficient location modulated in every block: empirically robust to
/// JPEG requantization. Exposed as a parameter for experimentation, but the
/// default must never change without invalidating existing masters.
pub const TARGET_COEFF: (usize, usize) = (4, 3);

/// Snap `c` to the nearest lattice point of parity `bit` under step `delta`.
/// Ties (the lattice point above and below are equidistant) favor the point
/// in the direction of `c`'s own sign.
pub fn embed_bit(c: f32, bit: u8, delta: f32) -> f32 {
    debug_assert!(bit == 0 || bit == 1);
    let r = c / delta;
    let q0 = r.round() as i64;

    let q = if (q0.rem_euclid(2)) as u8 == bit {
        q0
    } else {
        let lower = q0 - 1;
        let upper = q0 + 1;
        let d_lower = (r - lower as f32).abs();
        let d_upper = (upper as f32 - r).abs();
        match d_lower.partial_cmp(&d_upper).unwrap() {
            std::cmp::Ordering::Less => lower,
            std::cmp::Ordering::Greater => upper,
            std::cmp::Ordering::Equal => if c >= 0.0 { upper } else { lower },
        }
    };

    q as f32 * delta
}

/// Nearest-lattice decode: the parity of `round(c / delta)`.
pub fn extract_bit(c: f32, delta: f32) -> u8 {
    let q = (c / delta).round() as i64;
    (q.rem_euclid(2)) as u8
}
