//! Transform kernel — YCrCb split, single-level 2-D Haar DWT, and
//! the 8x8 DCT applied to the HL subband. All three submodules are exact
//! linear transforms carried in 32-bit float; rounding back to `u8` happens
//! only once, at the final pixel buffer.

pub mod color;
pub mod dct;
pub mod dwt;

pub use color::{rgb_to_ycrcb, ycrcb_to_rgb, YCrCbPlane};
pub use dct::{dct8x8, idct8x8, read_tile, write_tile, TILE};
pub use dwt::{haar_forward, haar_inverse, Subbands};
