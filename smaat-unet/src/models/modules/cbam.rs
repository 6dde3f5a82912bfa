//! # Convolutional Block Attention Module (CBAM)
//!
//! Re-weights a feature map first per channel, then per pixel. Output shape
//! always equals input shape. Inserted on skip paths and at the bottleneck.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BatchNorm, BatchNormConfig, Linear, LinearConfig, PaddingConfig2d, Relu,
    },
    prelude::*,
    tensor::activation::sigmoid,
};
use burn_extra_ops::{channel_avg_max_pool, global_avg_max_pool};

/// Configuration for the `ChannelAttention` module.
#[derive(Config, Debug)]
pub struct ChannelAttentionConfig {
    /// Number of channels of the gated map.
    channels: usize,
    /// Squeeze ratio of the shared MLP.
    #[config(default = "16")]
    reduction_ratio: usize,
}

impl ChannelAttentionConfig {
    /// Initializes a new `ChannelAttention` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> ChannelAttention<B> {
        let hidden = self.channels / self.reduction_ratio;

        ChannelAttention {
            squeeze: LinearConfig::new(self.channels, hidden).init(device),
            relu: Relu::new(),
            excite: LinearConfig::new(hidden, self.channels).init(device),
        }
    }
}

/// Channel attention: a shared squeeze-and-excite MLP over the spatial
/// average and spatial max of each channel.
#[derive(Module, Debug)]
pub struct ChannelAttention<B: Backend> {
    squeeze: Linear<B>,
    relu: Relu,
    excite: Linear<B>,
}

impl<B: Backend> ChannelAttention<B> {
    fn mlp(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        self.excite.forward(self.relu.forward(self.squeeze.forward(x)))
    }

    /// Per-channel weights in (0, 1).
    ///
    /// # Shapes
    /// - input: `[batch, channels, height, width]`
    /// - output: `[batch, channels]`
    pub fn weights(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let (avg, max) = global_avg_max_pool(x);
        sigmoid(self.mlp(avg) + self.mlp(max))
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let [batch, channels, height, width] = x.dims();
        let scale = self
            .weights(x.clone())
            .reshape([batch, channels, 1, 1])
            .expand([batch, channels, height, width]);

        x * scale
    }
}

/// Configuration for the `SpatialAttention` module.
#[derive(Config, Debug)]
pub struct SpatialAttentionConfig {
    /// Kernel size of the single convolution.
    #[config(default = "7")]
    kernel_size: usize,
}

impl SpatialAttentionConfig {
    /// Initializes a new `SpatialAttention` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> SpatialAttention<B> {
        let padding = self.kernel_size / 2;
        let conv = Conv2dConfig::new([2, 1], [self.kernel_size, self.kernel_size])
            .with_padding(PaddingConfig2d::Explicit(padding, padding))
            .with_bias(false)
            .init(device);
        let bn = BatchNormConfig::new(1).init(device);

        SpatialAttention { conv, bn }
    }
}

/// Spatial attention: one convolution over the channel-wise mean and max.
#[derive(Module, Debug)]
pub struct SpatialAttention<B: Backend> {
    conv: Conv2d<B>,
    bn: BatchNorm<B, 2>,
}

impl<B: Backend> SpatialAttention<B> {
    /// Per-pixel weights in (0, 1).
    ///
    /// # Shapes
    /// - input: `[batch, channels, height, width]`
    /// - output: `[batch, 1, height, width]`
    pub fn weights(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let (avg, max) = channel_avg_max_pool(x);
        let x = Tensor::cat(vec![avg, max], 1);
        let x = self.conv.forward(x);
        let x = self.bn.forward(x);

        sigmoid(x)
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let [batch, channels, height, width] = x.dims();
        let scale = self
            .weights(x.clone())
            .expand([batch, channels, height, width]);

        x * scale
    }
}

/// Configuration for the `Cbam` module.
#[derive(Config, Debug)]
pub struct CbamConfig {
    /// Number of channels of the gated map.
    channels: usize,
    /// Squeeze ratio of the channel MLP.
    #[config(default = "16")]
    reduction_ratio: usize,
    /// Kernel size of the spatial convolution.
    #[config(default = "7")]
    kernel_size: usize,
}

impl CbamConfig {
    /// Initializes a new `Cbam` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> Cbam<B> {
        Cbam {
            channel: ChannelAttentionConfig::new(self.channels)
                .with_reduction_ratio(self.reduction_ratio)
                .init(device),
            spatial: SpatialAttentionConfig::new()
                .with_kernel_size(self.kernel_size)
                .init(device),
        }
    }
}

/// Channel attention followed by spatial attention.
#[derive(Module, Debug)]
pub struct Cbam<B: Backend> {
    channel: ChannelAttention<B>,
    spatial: SpatialAttention<B>,
}

impl<B: Backend> Cbam<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.spatial.forward(self.channel.forward(x))
    }

    /// Channel weights of `x` and spatial weights of the channel-gated map.
    pub fn attention_weights(&self, x: Tensor<B, 4>) -> (Tensor<B, 2>, Tensor<B, 4>) {
        let channel_weights = self.channel.weights(x.clone());
        let spatial_weights = self.spatial.weights(self.channel.forward(x));

        (channel_weights, spatial_weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{ndarray::NdArrayDevice, NdArray};

    type TestBackend = NdArray;

    fn strictly_inside_unit_interval(values: &[f32]) -> bool {
        values.iter().all(|v| *v > 0.0 && *v < 1.0)
    }

    #[test]
    fn test_cbam_preserves_shape() {
        let device = NdArrayDevice::default();
        let cbam = CbamConfig::new(32).init::<TestBackend>(&device);

        let x = Tensor::<TestBackend, 4>::random(
            [2, 32, 9, 7],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        assert_eq!(cbam.forward(x).dims(), [2, 32, 9, 7]);
    }

    #[test]
    fn test_attention_weights_in_open_unit_interval() {
        let device = NdArrayDevice::default();
        let cbam = CbamConfig::new(64)
            .with_reduction_ratio(16)
            .init::<TestBackend>(&device);

        let x = Tensor::<TestBackend, 4>::random(
            [2, 64, 8, 8],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let (channel, spatial) = cbam.attention_weights(x);

        assert_eq!(channel.dims(), [2, 64]);
        assert_eq!(spatial.dims(), [2, 1, 8, 8]);
        assert!(strictly_inside_unit_interval(
            &channel.into_data().to_vec::<f32>().unwrap()
        ));
        assert!(strictly_inside_unit_interval(
            &spatial.into_data().to_vec::<f32>().unwrap()
        ));
    }

    #[test]
    fn test_cbam_is_product_of_input_and_weights() {
        let device = NdArrayDevice::default();
        let cbam = CbamConfig::new(16)
            .with_reduction_ratio(4)
            .init::<TestBackend>(&device);

        let x = Tensor::<TestBackend, 4>::random(
            [1, 16, 4, 4],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let (channel, spatial) = cbam.attention_weights(x.clone());
        let expected = x.clone()
            * channel.reshape([1, 16, 1, 1]).expand([1, 16, 4, 4])
            * spatial.expand([1, 16, 4, 4]);

        let diff = (cbam.forward(x) - expected).abs().max();
        assert!(diff.into_scalar() < 1e-6);
    }

    #[test]
    fn test_zero_input_gives_zero_output() {
        let device = NdArrayDevice::default();
        let cbam = CbamConfig::new(16)
            .with_reduction_ratio(16)
            .init::<TestBackend>(&device);

        let x = Tensor::<TestBackend, 4>::zeros([2, 16, 4, 4], &device);
        let y = cbam.forward(x);

        assert_eq!(y.abs().sum().into_scalar(), 0.0);
    }
}
