//! # Encoder
//!
//! The downsampling path: a stem `ConvBlock` and four `DownStage`s. The
//! outputs of the stem and of the first three stages are kept as skip
//! connections, optionally passed through a CBAM gate; the last stage's output
//! is the bottleneck.

use burn::prelude::*;

use super::{Cbam, CbamConfig, ConvBlock, ConvBlockConfig, DownStage, DownStageConfig};
use crate::config::{ModelConfig, DEPTH};

/// Configuration for the `Encoder` module.
#[derive(Config, Debug)]
pub struct EncoderConfig {
    config: ModelConfig,
}

impl EncoderConfig {
    /// Initializes a new `Encoder` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> Encoder<B> {
        let layout = self.config.variant.layout();
        let schedule = self.config.channel_schedule();
        let kernels_per_layer = self.config.kernels_per_layer;

        let stem = ConvBlockConfig::new(self.config.in_channels, schedule[0])
            .with_kind(layout.conv.clone())
            .with_kernels_per_layer(kernels_per_layer)
            .init(device);

        let downs = schedule
            .windows(2)
            .map(|pair| {
                DownStageConfig::new(pair[0], pair[1])
                    .with_kind(layout.conv.clone())
                    .with_kernels_per_layer(kernels_per_layer)
                    .init(device)
            })
            .collect();

        let skip_gates = if layout.skip_gates {
            schedule[..DEPTH]
                .iter()
                .map(|&channels| {
                    CbamConfig::new(channels)
                        .with_reduction_ratio(self.config.reduction_ratio)
                        .init(device)
                })
                .collect()
        } else {
            vec![]
        };

        Encoder {
            stem,
            downs,
            skip_gates,
        }
    }
}

/// Skip connections and bottleneck produced by one encoder pass.
///
/// Skips are ordered shallowest first; the decoder consumes them in reverse.
#[derive(Debug)]
pub struct EncoderOutput<B: Backend> {
    pub skips: Vec<Tensor<B, 4>>,
    pub bottleneck: Tensor<B, 4>,
}

/// The downsampling half of the network.
#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    pub(crate) stem: ConvBlock<B>,
    pub(crate) downs: Vec<DownStage<B>>,
    /// One gate per skip, or empty when skips are ungated.
    pub(crate) skip_gates: Vec<Cbam<B>>,
}

impl<B: Backend> Encoder<B> {
    fn gate(&self, stage: usize, x: Tensor<B, 4>) -> Tensor<B, 4> {
        match self.skip_gates.get(stage) {
            Some(gate) => gate.forward(x),
            None => x,
        }
    }

    /// Runs the encoder.
    ///
    /// The ungated stage output feeds the next stage, so gates never compound.
    pub fn forward(&self, x: Tensor<B, 4>) -> EncoderOutput<B> {
        let mut x = self.stem.forward(x);
        let mut skips = Vec::with_capacity(DEPTH);

        for (stage, down) in self.downs.iter().enumerate() {
            skips.push(self.gate(stage, x.clone()));
            x = down.forward(x);
        }

        EncoderOutput {
            skips,
            bottleneck: x,
        }
    }
}
