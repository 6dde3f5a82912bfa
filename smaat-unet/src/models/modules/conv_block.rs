//! # Convolution Blocks
//!
//! The leaf building block of every encoder and decoder stage: two
//! `conv -> BatchNorm -> ReLU` stages, with either full or
//! depthwise-separable 3x3 convolutions.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BatchNorm, BatchNormConfig, PaddingConfig2d, Relu,
    },
    prelude::*,
};

use crate::config::ConvKind;

/// Configuration for the `SeparableConv2d` module.
#[derive(Config, Debug)]
pub struct SeparableConv2dConfig {
    /// Number of input channels.
    in_channels: usize,
    /// Number of output channels.
    out_channels: usize,
    /// Depthwise filters per input channel.
    #[config(default = "1")]
    kernels_per_layer: usize,
    /// Spatial kernel size of the depthwise pass.
    #[config(default = "3")]
    kernel_size: usize,
    /// Zero padding of the depthwise pass.
    #[config(default = "1")]
    padding: usize,
}

impl SeparableConv2dConfig {
    /// Initializes a new `SeparableConv2d` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> SeparableConv2d<B> {
        let expanded = self.in_channels * self.kernels_per_layer;

        let depthwise = Conv2dConfig::new(
            [self.in_channels, expanded],
            [self.kernel_size, self.kernel_size],
        )
        .with_groups(self.in_channels)
        .with_padding(PaddingConfig2d::Explicit(self.padding, self.padding))
        .init(device);

        let pointwise = Conv2dConfig::new([expanded, self.out_channels], [1, 1]).init(device);

        SeparableConv2d {
            depthwise,
            pointwise,
        }
    }
}

/// A per-channel spatial convolution followed by a 1x1 channel-mixing convolution.
#[derive(Module, Debug)]
pub struct SeparableConv2d<B: Backend> {
    depthwise: Conv2d<B>,
    pointwise: Conv2d<B>,
}

impl<B: Backend> SeparableConv2d<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.pointwise.forward(self.depthwise.forward(x))
    }
}

/// An enum to wrap the two convolution flavours of a `ConvBlock` stage.
#[derive(Module, Debug)]
pub enum ConvLayer<B: Backend> {
    Standard(Conv2d<B>),
    Separable(SeparableConv2d<B>),
}

impl<B: Backend> ConvLayer<B> {
    /// Create a 3x3, same-size convolution of the requested flavour.
    fn new(
        kind: &ConvKind,
        [in_channels, out_channels]: [usize; 2],
        kernels_per_layer: usize,
        device: &Device<B>,
    ) -> Self {
        match kind {
            ConvKind::Standard => Self::Standard(
                Conv2dConfig::new([in_channels, out_channels], [3, 3])
                    .with_padding(PaddingConfig2d::Explicit(1, 1))
                    .init(device),
            ),
            ConvKind::Separable => Self::Separable(
                SeparableConv2dConfig::new(in_channels, out_channels)
                    .with_kernels_per_layer(kernels_per_layer)
                    .init(device),
            ),
        }
    }

    fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        match self {
            Self::Standard(conv) => conv.forward(x),
            Self::Separable(conv) => conv.forward(x),
        }
    }
}

/// Configuration for the `ConvBlock` module.
#[derive(Config, Debug)]
pub struct ConvBlockConfig {
    /// Number of input channels.
    in_channels: usize,
    /// Number of output channels.
    out_channels: usize,
    /// Output width of the first stage. Defaults to `out_channels`.
    #[config(default = "None")]
    mid_channels: Option<usize>,
    /// Convolution flavour.
    #[config(default = "ConvKind::Standard")]
    kind: ConvKind,
    /// Depthwise filters per input channel, separable flavour only.
    #[config(default = "1")]
    kernels_per_layer: usize,
}

impl ConvBlockConfig {
    /// Initializes a new `ConvBlock` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> ConvBlock<B> {
        let mid_channels = self.mid_channels.unwrap_or(self.out_channels);

        let conv_in = ConvLayer::new(
            &self.kind,
            [self.in_channels, mid_channels],
            self.kernels_per_layer,
            device,
        );
        let bn_in = BatchNormConfig::new(mid_channels).init(device);
        let conv_out = ConvLayer::new(
            &self.kind,
            [mid_channels, self.out_channels],
            self.kernels_per_layer,
            device,
        );
        let bn_out = BatchNormConfig::new(self.out_channels).init(device);

        ConvBlock {
            conv_in,
            bn_in,
            conv_out,
            bn_out,
            relu: Relu::new(),
        }
    }
}

/// Two successive `conv -> BatchNorm -> ReLU` stages.
///
/// Spatial size is preserved; only the channel count changes.
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    conv_in: ConvLayer<B>,
    bn_in: BatchNorm<B, 2>,
    conv_out: ConvLayer<B>,
    bn_out: BatchNorm<B, 2>,
    relu: Relu,
}

impl<B: Backend> ConvBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv_in.forward(x);
        let x = self.bn_in.forward(x);
        let x = self.relu.forward(x);
        let x = self.conv_out.forward(x);
        let x = self.bn_out.forward(x);

        self.relu.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{ndarray::NdArrayDevice, NdArray};

    type TestBackend = NdArray;

    #[test]
    fn test_conv_block_changes_channels_only() {
        let device = NdArrayDevice::default();
        for kind in [ConvKind::Standard, ConvKind::Separable] {
            let block = ConvBlockConfig::new(3, 8)
                .with_kind(kind)
                .with_kernels_per_layer(2)
                .init::<TestBackend>(&device);

            let x = Tensor::<TestBackend, 4>::random(
                [2, 3, 10, 6],
                burn::tensor::Distribution::Normal(0.0, 1.0),
                &device,
            );

            assert_eq!(block.forward(x).dims(), [2, 8, 10, 6]);
        }
    }

    #[test]
    fn test_conv_block_output_is_non_negative() {
        let device = NdArrayDevice::default();
        let block = ConvBlockConfig::new(4, 4)
            .with_mid_channels(Some(2))
            .init::<TestBackend>(&device);

        let x = Tensor::<TestBackend, 4>::random(
            [1, 4, 8, 8],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let y = block.forward(x);

        assert!(!y.lower_elem(0.0).any().into_scalar());
    }

    #[test]
    fn test_separable_uses_fewer_parameters() {
        let device = NdArrayDevice::default();
        let standard = ConvBlockConfig::new(64, 128).init::<TestBackend>(&device);
        let separable = ConvBlockConfig::new(64, 128)
            .with_kind(ConvKind::Separable)
            .with_kernels_per_layer(2)
            .init::<TestBackend>(&device);

        assert!(separable.num_params() < standard.num_params());
    }

    #[test]
    fn test_separable_conv_shapes() {
        let device = NdArrayDevice::default();
        let conv = SeparableConv2dConfig::new(4, 6)
            .with_kernels_per_layer(3)
            .init::<TestBackend>(&device);

        assert_eq!(conv.depthwise.weight.val().dims(), [12, 1, 3, 3]);
        assert_eq!(conv.pointwise.weight.val().dims(), [6, 12, 1, 1]);

        let x = Tensor::<TestBackend, 4>::zeros([1, 4, 5, 5], &device);
        assert_eq!(conv.forward(x).dims(), [1, 6, 5, 5]);
    }
}
