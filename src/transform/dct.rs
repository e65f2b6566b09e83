//! 8x8 type-II DCT (orthonormal norm) applied per-tile to the HL subband,
//! plus the tile read/write helpers the redundancy and QIM stages share.
//!
//! Implemented as a direct separable float transform (row pass then column
//! pass), computed directly with the exact orthonormal DCT-II/DCT-III
//! formulas in 32-bit float rather than a fixed-point approximation or an
//! external FFT wrapper, so the kernel is fixed and reproducible.

use std::f32::consts::PI;

pub const TILE: usize = 8;

#[inline]
fn norm_coeff(u: usize) -> f32 {
    if u == 0 { (1.0 / TILE as f32).sqrt() } else { (2.0 / TILE as f32).sqrt() }
}

fn dct_1d(input: &[f32; TILE]) -> [f32; TILE] {
    let mut out = [0f32; TILE];
    for (u, slot) in out.iter_mut().enumerate() {
        let cu = norm_coeff(u);
        let mut sum = 0f32;
        for (x, &v) in input.iter().enumerate() {
            sum += v * (PI * (2.0 * x as f32 + 1.0) * u as f32 / (2.0 * TILE as f32)).cos();
        }
        *slot = cu * sum;
    }
    out
}

fn idct_1d(input: &[f32; TILE]) -> [f32; TILE] {
    let mut out = [0f32; TILE];
    for (x, slot) in out.iter_mut().enumerate() {
        let mut sum = 0f32;
        for (u, &v) in input.iter().enumerate() {
            sum += norm_coeff(u) * v * (PI * (2.0 * x as f32 + 1.0) * u as f32 / (2.0 * TILE as f32)).cos();
        }
        *slot = sum;
    }
    out
}

pub fn dct8x8(tile: &[[f32; TILE]; TILE]) -> [[f32; TILE]; TILE] {
    let mut rows = [[0f32; TILE]; TILE];
    for r in 0..TILE {
        rows[r] = dct_1d(&tile[r]);
    }
    let mut out = [[0f32; TILE]; TILE];
    for c in 0..TILE {
        let col: [f32; TILE] = std::array::from_fn(|r| rows[r][c]);
        let col_t = dct_1d(&col);
        for r in 0..TILE {
            out[r][c] = col_t[r];
        }
    }
    out
}

pub fn idct8x8(coeffs: &[[f32; TILE]; TILE]) -> [[f32; TILE]; TILE] {
    let mut cols = [[0f32; TILE]; TILE];
    for c in 0..TILE {
        let col: [f32; TILE] = std::array::from_fn(|r| coeffs[r][c]);
        let col_t = idct_1d(&col);
        for r in 0..TILE {
            cols[r][c] = col_t[r];
        }
    }
    let mut out = [[0f32; TILE]; TILE];
    for (r, slot) in out.iter_mut().enumerate() {
        *slot = idct_1d(&cols[r]);
    }
    out
}

/// Read one 8x8 tile out of a row-major subband plane at `(row, col)`.
pub fn read_tile(plane: &[f32], plane_width: u32, row: u32, col: u32) -> [[f32; TILE]; TILE] {
    std::array::from_fn(|r| {
        std::array::from_fn(|c| plane[((row + r as u32) * plane_width + col + c as u32) as usize])
    })
}

/// Write one 8x8 tile back into a row-major subband plane at `(row, col)`.
pub fn write_tile(plane: &mut [f32], plane_width: u32, row: u32, col: u32, tile: &[[f32; TILE]; TILE]) {
    for (r, tile_row) in tile.iter().enumerate() {
        for (c, &v) in tile_row.iter().enumerate() {
            plane[((row + r as u32) * plane_width + col + c as u32) as usize] = v;
        }
    }
}
