//! # Global Pooling
//!
//! Reductions over whole axes of a `[batch, channels, height, width]` map, as
//! consumed by channel and spatial attention gates.

use burn::prelude::*;

/// Global average and global max over the spatial axes.
///
/// # Shapes
/// - input: `[batch, channels, height, width]`
/// - output: two tensors of shape `[batch, channels]`
pub fn global_avg_max_pool<B: Backend>(x: Tensor<B, 4>) -> (Tensor<B, 2>, Tensor<B, 2>) {
    let [batch, channels, height, width] = x.dims();
    let flat = x.reshape([batch, channels, height * width]);

    let avg = flat.clone().mean_dim(2).reshape([batch, channels]);
    let max = flat.max_dim(2).reshape([batch, channels]);

    (avg, max)
}

/// Mean and max across the channel axis, keeping it as a singleton.
///
/// # Shapes
/// - input: `[batch, channels, height, width]`
/// - output: two tensors of shape `[batch, 1, height, width]`
pub fn channel_avg_max_pool<B: Backend>(x: Tensor<B, 4>) -> (Tensor<B, 4>, Tensor<B, 4>) {
    let avg = x.clone().mean_dim(1);
    let max = x.max_dim(1);

    (avg, max)
}
