//! # Bottleneck LSTM Attention
//!
//! Gives the bottleneck a receptive field over the whole downsampled grid.
//! Every spatial position becomes one element of a sequence, a bidirectional
//! LSTM mixes context along it, and a learned softmax over positions decides
//! how much each position's recurrent features contribute before they are
//! projected back to the bottleneck width.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BiLstm, BiLstmConfig, Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::softmax,
};
use burn_extra_ops::{flatten_positions, unflatten_positions};

/// Configuration for the `LstmAttention` module.
#[derive(Config, Debug)]
pub struct LstmAttentionConfig {
    /// Width of the bottleneck feature map.
    channels: usize,
    /// Hidden width of each LSTM direction.
    #[config(default = "128")]
    hidden: usize,
}

impl LstmAttentionConfig {
    /// Initializes a new `LstmAttention` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> LstmAttention<B> {
        let encoded = self.hidden * 2;

        LstmAttention {
            lstm: BiLstmConfig::new(self.channels, self.hidden, true).init(device),
            score: LinearConfig::new(encoded, 1).init(device),
            project: Conv2dConfig::new([encoded, self.channels], [1, 1]).init(device),
        }
    }
}

/// BiLSTM over spatial positions with softmax relevance re-weighting.
#[derive(Module, Debug)]
pub struct LstmAttention<B: Backend> {
    lstm: BiLstm<B>,
    score: Linear<B>,
    project: Conv2d<B>,
}

impl<B: Backend> LstmAttention<B> {
    /// Runs the BiLSTM over the flattened grid.
    ///
    /// Returns `[batch, height * width, 2 * hidden]`.
    fn encode(&self, x: Tensor<B, 4>) -> Tensor<B, 3> {
        let (encoded, _state) = self.lstm.forward(flatten_positions(x), None);
        encoded
    }

    /// Softmax over positions of the per-position scores, `[batch, positions, 1]`.
    fn relevance_of(&self, encoded: Tensor<B, 3>) -> Tensor<B, 3> {
        softmax(self.score.forward(encoded), 1)
    }

    /// Relevance distribution over spatial positions.
    ///
    /// Each row sums to one.
    ///
    /// # Shapes
    /// - input: `[batch, channels, height, width]`
    /// - output: `[batch, height * width]`
    pub fn relevance(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch, _, height, width] = x.dims();
        self.relevance_of(self.encode(x))
            .reshape([batch, height * width])
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let [_, _, height, width] = x.dims();

        let encoded = self.encode(x);
        let [batch, positions, features] = encoded.dims();
        let weights = self
            .relevance_of(encoded.clone())
            .expand([batch, positions, features]);

        let attended = unflatten_positions(encoded * weights, [height, width]);

        self.project.forward(attended)
    }
}
