//! # Resampling Stages
//!
//! `DownStage` halves the resolution on the encoder side; `UpStage` doubles it
//! on the decoder side and merges the matching skip connection.

use burn::{
    nn::{
        conv::{ConvTranspose2d, ConvTranspose2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
    },
    prelude::*,
    tensor::{
        module::interpolate,
        ops::{InterpolateMode, InterpolateOptions},
    },
};
use burn_extra_ops::FeatureMapOps;

use super::{ConvBlock, ConvBlockConfig};
use crate::config::{ConvKind, Upsampling};

/// Configuration for the `DownStage` module.
#[derive(Config, Debug)]
pub struct DownStageConfig {
    /// Number of input channels.
    in_channels: usize,
    /// Number of output channels.
    out_channels: usize,
    /// Convolution flavour of the block.
    #[config(default = "ConvKind::Standard")]
    kind: ConvKind,
    /// Depthwise filters per input channel, separable flavour only.
    #[config(default = "1")]
    kernels_per_layer: usize,
}

impl DownStageConfig {
    /// Initializes a new `DownStage` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> DownStage<B> {
        DownStage {
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            conv: ConvBlockConfig::new(self.in_channels, self.out_channels)
                .with_kind(self.kind.clone())
                .with_kernels_per_layer(self.kernels_per_layer)
                .init(device),
        }
    }
}

/// 2x2 max-pooling followed by a `ConvBlock`.
#[derive(Module, Debug)]
pub struct DownStage<B: Backend> {
    pool: MaxPool2d,
    conv: ConvBlock<B>,
}

impl<B: Backend> DownStage<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.conv.forward(self.pool.forward(x))
    }
}

/// Parameter-free 2x bilinear upsampling.
#[derive(Module, Debug, Clone)]
pub struct BilinearUpsample;

impl BilinearUpsample {
    pub const fn new() -> Self {
        Self {}
    }

    pub fn forward<B: Backend>(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let [height, width] = x.spatial_dims();
        interpolate(
            x,
            [height * 2, width * 2],
            InterpolateOptions::new(InterpolateMode::Bilinear),
        )
    }
}

/// An enum to wrap the two upsampling modes of an `UpStage`.
#[derive(Module, Debug)]
pub enum Upsample<B: Backend> {
    Transposed(ConvTranspose2d<B>),
    Bilinear(BilinearUpsample),
}

impl<B: Backend> Upsample<B> {
    fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        match self {
            Self::Transposed(up) => up.forward(x),
            Self::Bilinear(up) => up.forward(x),
        }
    }
}

/// Configuration for the `UpStage` module.
#[derive(Config, Debug)]
pub struct UpStageConfig {
    /// Width after concatenating the upsampled map with its skip.
    in_channels: usize,
    /// Number of output channels.
    out_channels: usize,
    /// Upsampling mode.
    #[config(default = "Upsampling::Bilinear")]
    upsampling: Upsampling,
    /// Convolution flavour of the block.
    #[config(default = "ConvKind::Standard")]
    kind: ConvKind,
    /// Depthwise filters per input channel, separable flavour only.
    #[config(default = "1")]
    kernels_per_layer: usize,
}

impl UpStageConfig {
    /// Initializes a new `UpStage` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> UpStage<B> {
        let block = ConvBlockConfig::new(self.in_channels, self.out_channels)
            .with_kind(self.kind.clone())
            .with_kernels_per_layer(self.kernels_per_layer);

        let (upsample, block) = match self.upsampling {
            Upsampling::Bilinear => (
                Upsample::Bilinear(BilinearUpsample::new()),
                block.with_mid_channels(Some(self.in_channels / 2)),
            ),
            Upsampling::Transposed => (
                Upsample::Transposed(
                    ConvTranspose2dConfig::new([self.in_channels, self.in_channels / 2], [2, 2])
                        .with_stride([2, 2])
                        .init(device),
                ),
                block,
            ),
        };

        UpStage {
            upsample,
            conv: block.init(device),
        }
    }
}

/// 2x upsampling, alignment to the skip, concatenation `[skip, x]` and a `ConvBlock`.
#[derive(Module, Debug)]
pub struct UpStage<B: Backend> {
    upsample: Upsample<B>,
    conv: ConvBlock<B>,
}

impl<B: Backend> UpStage<B> {
    /// # Shapes
    /// - x: `[batch, cx, h, w]`
    /// - skip: `[batch, cs, ~2h, ~2w]`
    /// - output: `[batch, out_channels, skip height, skip width]`
    pub fn forward(&self, x: Tensor<B, 4>, skip: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.upsample.forward(x);
        let x = x.align_spatial(skip.spatial_dims());
        let x = Tensor::cat(vec![skip, x], 1);

        self.conv.forward(x)
    }
}
