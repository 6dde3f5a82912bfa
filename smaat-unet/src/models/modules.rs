//! # Building Blocks
//!
//! Leaf modules shared by every variant: convolution blocks, resampling
//! stages, CBAM gates and the bottleneck LSTM attention.

mod cbam;
mod conv_block;
mod lstm_attention;
mod sampling;

pub use cbam::*;
pub use conv_block::*;
pub use lstm_attention::*;
pub use sampling::*;
