//! One-level 2-D Haar DWT over the Y plane only, as a 2x2 butterfly applied
//! plane-wide in `f32`.
//!
//! The forward matrix is symmetric and self-inverse once scaled by 1/2, so
//! `haar_inverse` reuses the exact same coefficient pattern as
//! `haar_forward` — this is what makes the pair an exact inverse rather
//! than an approximate one.
//!
//! Callers must pass even `width`/`height`; `orchestration` pads odd-sized
//! inputs before calling in and crops the padding back off after calling out.

#[derive(Debug, Clone)]
pub struct Subbands {
    pub ll: Vec<f32>,
    pub lh: Vec<f32>,
    pub hl: Vec<f32>,
    pub hh: Vec<f32>,
    pub sub_width: u32,
    pub sub_height: u32,
}

pub fn haar_forward(y: &[f32], width: u32, height: u32) -> Subbands {
    debug_assert_eq!(width % 2, 0, "haar_forward requires even width");
    debug_assert_eq!(height % 2, 0, "haar_forward requires even height");
    debug_assert_eq!(y.len(), (width as usize) * (height as usize));

    let sub_width = width / 2;
    let sub_height = height / 2;
    let n = (sub_width as usize) * (sub_height as usize);
    let (mut ll, mut lh, mut hl, mut hh) = (vec![0f32; n], vec![0f32; n], vec![0f32; n], vec![0f32; n]);

    for i in 0..sub_height {
        for j in 0..sub_width {
            let a = y[((2 * i) * width + 2 * j) as usize];
            let b = y[((2 * i) * width + 2 * j + 1) as usize];
            let c = y[((2 * i + 1) * width + 2 * j) as usize];
            let d = y[((2 * i + 1) * width + 2 * j + 1) as usize];
            let idx = (i * sub_width + j) as usize;
            ll[idx] = (a + b + c + d) * 0.5;
            lh[idx] = (a + b - c - d) * 0.5;
            hl[idx] = (a - b + c - d) * 0.5;
            hh[idx] = (a - b - c + d) * 0.5;
        }
    }

    Subbands { ll, lh, hl, hh, sub_width, sub_height }
}

pub fn haar_inverse(sb: &Subbands) -> Vec<f32> {
    let width = sb.sub_width * 2;
    let height = sb.sub_height * 2;
    let mut y = vec![0f32; (width as usize) * (height as usize)];

    for i in 0..sb.sub_height {
        for j in 0..sb.sub_width {
            let idx = (i * sb.sub_width + j) as usize;
            let (ll, lh, hl, hh) = (sb.ll[idx], sb.lh[idx], sb.hl[idx], sb.hh[idx]);
            let a = (ll + lh + hl + hh) * 0.5;
            let b = (ll + lh - hl - hh) * 0.5;
            let c = (ll - lh + hl - hh) * 0.5;
            let d = (ll - lh - hl + hh) * 0.5;
            y[((2 * i) * width + 2 * j) as usize] = a;
            y[((2 * i) * width + 2 * j + 1) as usize] = b;
            y[((2 * i + 1) * width + 2 * j) as usize] = c;
            y[((2 * i + 1) * width + 2 * j + 1) as usize] = d;
        }
    }

    y
}
