//! # Position Sequences
//!
//! Converts between a feature map and a sequence over its spatial positions,
//! one element per pixel in row-major order.

use burn::prelude::*;

/// Flattens the spatial grid into a sequence of channel vectors.
///
/// # Shapes
/// - input: `[batch, channels, height, width]`
/// - output: `[batch, height * width, channels]`
pub fn flatten_positions<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 3> {
    let [batch, channels, height, width] = x.dims();
    x.permute([0, 2, 3, 1])
        .reshape([batch, height * width, channels])
}

/// Inverse of [`flatten_positions`].
///
/// # Shapes
/// - input: `[batch, height * width, channels]`
/// - output: `[batch, channels, height, width]`
pub fn unflatten_positions<B: Backend>(
    x: Tensor<B, 3>,
    [height, width]: [usize; 2],
) -> Tensor<B, 4> {
    let [batch, _, channels] = x.dims();
    x.reshape([batch, height, width, channels])
        .permute([0, 3, 1, 2])
}
