//! Feature-map helpers for the Burn deep learning framework
//!
//! This crate provides small tensor operations used by encoder/decoder
//! networks that are not available in the core Burn framework: spatial
//! alignment of skip connections, global pooling for attention gates and
//! conversion between feature maps and position sequences.

use burn::prelude::*;

mod align;
mod pooling;
mod positions;

// Convenient re-exports
pub use align::align_spatial;
pub use pooling::{channel_avg_max_pool, global_avg_max_pool};
pub use positions::{flatten_positions, unflatten_positions};

/// Additional operations for 4D feature maps
pub trait FeatureMapOps<B: Backend> {
    /// Pad or crop the spatial dimensions to `[height, width]`
    fn align_spatial(self, size: [usize; 2]) -> Self;

    /// Spatial size as `[height, width]`
    fn spatial_dims(&self) -> [usize; 2];
}

impl<B: Backend> FeatureMapOps<B> for Tensor<B, 4> {
    fn align_spatial(self, size: [usize; 2]) -> Self {
        align_spatial(self, size)
    }

    fn spatial_dims(&self) -> [usize; 2] {
        let [_, _, height, width] = self.dims();
        [height, width]
    }
}
