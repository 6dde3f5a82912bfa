//! # UNet Model Family
//!
//! This module composes the encoder, the optional bottleneck stages and the
//! decoder into one configurable graph. Every named variant is a point in the
//! same builder, so wiring is shared and optional stages are chosen once, when
//! the model is built.
//!
//! ## Core Components
//!
//! - `UNetConfig`: Wraps a `ModelConfig` and builds the model.
//! - `UNet`: Runs stem → encoder → bottleneck → decoder → 1x1 projection.
//! - `Bottleneck`: Optional CBAM gate followed by optional LSTM attention.

use burn::{
    module::Ignored,
    nn::conv::{Conv2d, Conv2dConfig},
    prelude::*,
};

use super::{
    Cbam, CbamConfig, Decoder, DecoderConfig, Encoder, EncoderConfig, EncoderOutput,
    LstmAttention, LstmAttentionConfig,
};
use crate::{
    config::{ModelConfig, Variant, DEPTH, SPATIAL_MULTIPLE},
    error::{UNetError, UNetResult},
};

/// Configuration for the `Bottleneck` module.
#[derive(Config, Debug)]
pub struct BottleneckConfig {
    config: ModelConfig,
}

impl BottleneckConfig {
    /// Initializes a new `Bottleneck` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> Bottleneck<B> {
        let layout = self.config.variant.layout();
        let channels = self.config.channel_schedule()[DEPTH];

        let gate = layout.bottleneck_gate.then(|| {
            CbamConfig::new(channels)
                .with_reduction_ratio(self.config.reduction_ratio)
                .init(device)
        });
        let lstm_attention = layout.bottleneck_lstm.then(|| {
            LstmAttentionConfig::new(channels)
                .with_hidden(self.config.lstm_hidden)
                .init(device)
        });

        Bottleneck {
            gate,
            lstm_attention,
        }
    }
}

/// Optional stages applied to the deepest feature map.
#[derive(Module, Debug)]
pub struct Bottleneck<B: Backend> {
    pub(crate) gate: Option<Cbam<B>>,
    pub(crate) lstm_attention: Option<LstmAttention<B>>,
}

impl<B: Backend> Bottleneck<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = match &self.gate {
            Some(gate) => gate.forward(x),
            None => x,
        };

        match &self.lstm_attention {
            Some(lstm_attention) => lstm_attention.forward(x),
            None => x,
        }
    }
}

/// Configuration for the `UNet` model.
#[derive(Config, Debug)]
pub struct UNetConfig {
    /// The model hyperparameters.
    config: ModelConfig,
}

impl UNetConfig {
    /// Initializes a model with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `device` - The device to create the model on.
    ///
    /// # Errors
    ///
    /// Returns `UNetError::InvalidConfiguration` if the configuration fails validation.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> UNetResult<UNet<B>> {
        self.config.validate()?;

        let schedule = self.config.channel_schedule();
        tracing::debug!(
            variant = self.config.variant.name(),
            upsampling = ?self.config.upsampling,
            ?schedule,
            "building model"
        );

        let outc = Conv2dConfig::new([schedule[0], self.config.out_channels], [1, 1]).init(device);

        Ok(UNet {
            encoder: EncoderConfig::new(self.config.clone()).init(device),
            bottleneck: BottleneckConfig::new(self.config.clone()).init(device),
            decoder: DecoderConfig::new(self.config.clone()).init(device),
            outc,
            in_channels: self.config.in_channels,
            variant: Ignored(self.config.variant.clone()),
        })
    }
}

/// An encoder–decoder regression network with optional attention stages.
#[derive(Module, Debug)]
pub struct UNet<B: Backend> {
    /// Stem and downsampling stages, with optional skip gates.
    pub(crate) encoder: Encoder<B>,
    /// Optional bottleneck gate and LSTM attention.
    pub(crate) bottleneck: Bottleneck<B>,
    /// Upsampling stages.
    pub(crate) decoder: Decoder<B>,
    /// 1x1 output projection.
    pub(crate) outc: Conv2d<B>,
    in_channels: usize,
    variant: Ignored<Variant>,
}

impl<B: Backend> UNet<B> {
    /// The variant this model was built as.
    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    fn check_input(&self, x: &Tensor<B, 4>) -> UNetResult<()> {
        let [batch, channels, height, width] = x.dims();

        if batch == 0 || height == 0 || width == 0 {
            return Err(UNetError::InvalidTensorShape {
                expected: format!("[B, {}, H, W] with B, H and W non-zero", self.in_channels),
                actual: format!("{:?}", x.dims()),
            });
        }
        if channels != self.in_channels {
            return Err(UNetError::InvalidTensorShape {
                expected: format!("[{batch}, {}, {height}, {width}]", self.in_channels),
                actual: format!("{:?}", x.dims()),
            });
        }
        if height % SPATIAL_MULTIPLE != 0 || width % SPATIAL_MULTIPLE != 0 {
            return Err(UNetError::InvalidTensorShape {
                expected: format!(
                    "[{batch}, {channels}, H, W] with H and W divisible by {SPATIAL_MULTIPLE}"
                ),
                actual: format!("{:?}", x.dims()),
            });
        }

        Ok(())
    }

    /// The forward pass.
    ///
    /// # Arguments
    ///
    /// * `x` - The input tensor of shape `[B, in_channels, H, W]`, non-empty, with `H`
    ///   and `W` divisible by 16.
    ///
    /// # Returns
    ///
    /// Unnormalised regression values of shape `[B, out_channels, H, W]`.
    ///
    /// # Errors
    ///
    /// Returns `UNetError::InvalidTensorShape` if the channel count or spatial size
    /// violates the contract above.
    pub fn forward(&self, x: Tensor<B, 4>) -> UNetResult<Tensor<B, 4>> {
        self.check_input(&x)?;

        // ########## Encoder ##########
        let EncoderOutput { skips, bottleneck } = self.encoder.forward(x);
        let x = self.bottleneck.forward(bottleneck);
        // ########## Decoder ##########
        let x = self.decoder.forward(x, skips);

        Ok(self.outc.forward(x))
    }
}
