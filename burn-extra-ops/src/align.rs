//! # Spatial Alignment
//!
//! Brings a feature map to a reference height and width so that it can be
//! concatenated with another map along the channel axis. Used where an
//! upsampled map and a skip connection disagree by a few pixels.

use core::ops::Range;

use burn::prelude::*;

/// Aligns the spatial dimensions of `x` to `[height, width]`.
///
/// A dimension that is too small is zero-padded symmetrically; the odd pixel
/// goes to the bottom/right. A dimension that is too large is cropped around
/// its centre, again dropping the odd pixel from the bottom/right.
///
/// # Shapes
/// - input: `[batch, channels, h, w]`
/// - output: `[batch, channels, height, width]`
pub fn align_spatial<B: Backend>(x: Tensor<B, 4>, [height, width]: [usize; 2]) -> Tensor<B, 4> {
    let [batch, channels, h, w] = x.dims();
    if h == height && w == width {
        return x;
    }

    let x = if h > height || w > width {
        x.slice([
            0..batch,
            0..channels,
            crop_range(h, height),
            crop_range(w, width),
        ])
    } else {
        x
    };

    let [_, _, h, w] = x.dims();
    let pad_y = height.saturating_sub(h);
    let pad_x = width.saturating_sub(w);
    if pad_y == 0 && pad_x == 0 {
        return x;
    }

    x.pad(
        (pad_x / 2, pad_x - pad_x / 2, pad_y / 2, pad_y - pad_y / 2),
        0.0,
    )
}

/// Centre window of length `target` within `len`, or the full range when `len <= target`.
fn crop_range(len: usize, target: usize) -> Range<usize> {
    if len <= target {
        return 0..len;
    }
    let start = (len - target) / 2;
    start..start + target
}
