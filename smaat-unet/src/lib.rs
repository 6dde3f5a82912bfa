//! # SmaAt-UNet
//!
//! Encoder–decoder networks for precipitation nowcasting, built on Burn.
//!
//! A single [`UNetConfig`] builds any member of the family: the plain UNet,
//! its depthwise-separable counterpart, the CBAM-gated SmaAt-UNet and a variant
//! with bidirectional LSTM attention at the bottleneck. The model regresses
//! future rainfall maps from a stack of past radar frames.
//!
//! ```no_run
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use smaat_unet::{ModelConfig, UNetConfig, Variant};
//!
//! let device = Default::default();
//! let config = ModelConfig::new().with_variant(Variant::DsAttention);
//! let model = UNetConfig::new(config).init::<NdArray>(&device)?;
//!
//! let frames = Tensor::<NdArray, 4>::zeros([1, 12, 288, 288], &device);
//! let forecast = model.forward(frames)?;
//! assert_eq!(forecast.dims(), [1, 1, 288, 288]);
//! # Ok::<(), smaat_unet::UNetError>(())
//! ```

mod config;
mod error;
mod models;
mod weights;

#[cfg(test)]
mod tests;

pub use config::*;
pub use error::{UNetError, UNetResult};
pub use models::{
    Bottleneck, BottleneckConfig, Cbam, CbamConfig, ChannelAttention, ChannelAttentionConfig,
    ConvBlock, ConvBlockConfig, Decoder, DecoderConfig, DownStage, DownStageConfig, Encoder,
    EncoderConfig, EncoderOutput, LstmAttention, LstmAttentionConfig, SeparableConv2d,
    SeparableConv2dConfig, SpatialAttention, SpatialAttentionConfig, UNet, UNetConfig, UNetRecord,
    UpStage, UpStageConfig,
};
#[cfg(feature = "pretrained")]
pub use weights::load_pytorch_weights;
pub use weights::{load_checkpoint, save_checkpoint};
