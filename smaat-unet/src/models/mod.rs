//! # Model Architectures
//!
//! This module aggregates the encoder/decoder model family.
//! It is organized into sub-modules for clarity:
//!
//! - `modules`: Leaf building blocks (convolution blocks, resampling stages,
//!   CBAM, bottleneck LSTM attention).
//! - `encoder`: The downsampling path that captures skip connections.
//! - `decoder`: The upsampling path that consumes them.
//! - `unet`: Composes the stages into the configured variant.

pub mod decoder;
pub mod encoder;
pub mod modules;
pub mod unet;

pub use decoder::*;
pub use encoder::*;
pub use modules::*;
pub use unet::*;
