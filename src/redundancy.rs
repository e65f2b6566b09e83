//! Redundant-bit encoder / voter — the Adaptive Top-N Strategy.
//!
//! Replicates the 256 payload bits across 1280 blocks (5.0x redundancy) by
//! intersecting a variance-ranked safety buffer with the key-driven
//! permutation, then recovers via per-bit majority voting with confidence.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::block_index::BlockCoord;
use crate::error::WatermarkError;
use crate::transform::dct::TILE;

pub const REDUNDANCY: usize = 5;
pub const PAYLOAD_BITS: usize = 256;
pub const BLOCKS_NEEDED: usize = PAYLOAD_BITS * REDUNDANCY; // 1280
pub const SAFETY_BUFFER: usize = BLOCKS_NEEDED * 2; // 2560

/// Population variance of the 8x8 tile at `(row, col)` within `plane`.
pub fn tile_variance(plane: &[f32], plane_width: u32, row: u32, col: u32) -> f32 {
    let n = (TILE * TILE) as f32;
    let mut sum = 0f32;
    let mut sum_sq = 0f32;
    for dy in 0..TILE as u32 {
        for dx in 0..TILE as u32 {
            let v = plane[((row + dy) * plane_width + col + dx) as usize];
            sum += v;
            sum_sq += v * v;
        }
    }
    let mean = sum / n;
    (sum_sq / n) - mean * mean
}

/// Variance of every aligned 8x8 tile in an `w_sub x h_sub` subband.
pub fn compute_variances(plane: &[f32], sub_width: u32, sub_height: u32) -> Vec<(BlockCoord, f32)> {
    let mut out = Vec::new();
    let mut row = 0u32;
    while row + 8 <= sub_height {
        let mut col = 0u32;
        while col + 8 <= sub_width {
            out.push(((row, col), tile_variance(plane, sub_width, row, col)));
            col += 8;
        }
        row += 8;
    }
    out
}

/// Rank tiles by descending variance, breaking ties by ascending `(row,
/// col)` — "coordinate anchoring", mandatory to defeat ordering jitter
/// introduced by lossy re-encoding.
fn rank_by_variance(mut variances: Vec<(BlockCoord, f32)>) -> Vec<(BlockCoord, f32)> {
    variances.sort_by(|a, b| {
        b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0))
    });
    variances
}

/// Take the top `2*B` tiles by variance, intersect (preserving key order)
/// with the key-driven permutation, and return the first `B` survivors.
///
/// Both the embedder and extractor run this identical procedure over the
/// identical HL subband, so they agree on the chosen blocks without
/// persisting anything.
pub fn select_blocks(
    variances: Vec<(BlockCoord, f32)>,
    key_order: &[BlockCoord],
) -> Result<Vec<BlockCoord>, WatermarkError> {
    let ranked = rank_by_variance(variances);
    let safety_buffer: HashSet<BlockCoord> =
        ranked.into_iter().take(SAFETY_BUFFER).map(|(c, _)| c).collect();

    let selected: Vec<BlockCoord> =
        key_order.iter().filter(|c| safety_buffer.contains(c)).copied().take(BLOCKS_NEEDED).collect();

    if selected.len() < BLOCKS_NEEDED {
        return Err(WatermarkError::InvariantViolation(format!(
            "only {} of {} required blocks survived key intersection",
            selected.len(),
            BLOCKS_NEEDED
        )));
    }

    Ok(selected)
}

/// Assign the i-th chosen tile to bit index `i mod N` (column-major
/// replication across the R rounds).
pub fn assign_bits(blocks: &[BlockCoord]) -> Vec<(BlockCoord, usize)> {
    blocks.iter().enumerate().map(|(i, c)| (*c, i % PAYLOAD_BITS)).collect()
}

/// Per-bit majority vote. `samples[i]` holds every observed bit for payload
/// position `i`; confidence is `min_i (majority_count_i / samples[i].len())`.
pub fn vote(samples: &[Vec<u8>]) -> Result<(Vec<u8>, f32), WatermarkError> {
    let mut bits = Vec::with_capacity(samples.len());
    let mut min_confidence = 1.0f32;

    for pos_samples in samples {
        if pos_samples.is_empty() {
            return Err(WatermarkError::TooSmall);
        }
        let ones = pos_samples.iter().filter(|&&b| b == 1).count();
        let zeros = pos_samples.len() - ones;
        let bit = if ones >= zeros { 1 } else { 0 };
        let majority = ones.max(zeros);
        let confidence = majority as f32 / pos_samples.len() as f32;
        min_confidence = min_confidence.min(confidence);
        bits.push(bit);
    }

    Ok((bits, min_confidence))
}
