//! # Decoder
//!
//! Four `UpStage`s mirroring the encoder. Stage `i` consumes the skip captured
//! by encoder stage `DEPTH - 1 - i`.

use burn::prelude::*;

use super::{UpStage, UpStageConfig};
use crate::config::{ModelConfig, DEPTH};

/// Configuration for the `Decoder` module.
#[derive(Config, Debug)]
pub struct DecoderConfig {
    config: ModelConfig,
}

impl DecoderConfig {
    /// Initializes a new `Decoder` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> Decoder<B> {
        let layout = self.config.variant.layout();

        let ups = self
            .config
            .decoder_channels()
            .into_iter()
            .map(|(in_channels, out_channels)| {
                UpStageConfig::new(in_channels, out_channels)
                    .with_upsampling(self.config.upsampling.clone())
                    .with_kind(layout.conv.clone())
                    .with_kernels_per_layer(self.config.kernels_per_layer)
                    .init(device)
            })
            .collect();

        Decoder { ups }
    }
}

/// The upsampling half of the network.
#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    pub(crate) ups: Vec<UpStage<B>>,
}

impl<B: Backend> Decoder<B> {
    /// Runs the decoder from the bottleneck `x`.
    ///
    /// `skips` must be ordered shallowest first, as produced by the encoder.
    pub fn forward(&self, x: Tensor<B, 4>, skips: Vec<Tensor<B, 4>>) -> Tensor<B, 4> {
        debug_assert_eq!(skips.len(), DEPTH);

        self.ups
            .iter()
            .zip(skips.into_iter().rev())
            .fold(x, |x, (up, skip)| up.forward(x, skip))
    }
}
