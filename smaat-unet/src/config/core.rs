//! Core configuration structures.
//!
//! This module contains the hyperparameters that fully determine the module
//! graph and every channel count of a model.

use burn::prelude::*;

use super::enums::*;
use crate::error::{UNetError, UNetResult};

/// Number of 2x downsampling stages between the stem and the bottleneck.
pub const DEPTH: usize = 4;

/// Spatial sizes fed to the model must be multiples of this.
pub const SPATIAL_MULTIPLE: usize = 1 << DEPTH;

/// Main configuration for the model family.
///
/// Immutable once a model is built from it.
#[derive(Config, Debug)]
pub struct ModelConfig {
    /// Number of input channels (e.g. stacked radar frames).
    #[config(default = "12")]
    pub in_channels: usize,
    /// Number of regression output channels.
    #[config(default = "1")]
    pub out_channels: usize,
    /// Which optional stages are present.
    #[config(default = "Variant::DsAttention")]
    pub variant: Variant,
    /// Decoder upsampling mode.
    #[config(default = "Upsampling::Bilinear")]
    pub upsampling: Upsampling,
    /// Squeeze ratio of the CBAM channel MLP.
    #[config(default = "16")]
    pub reduction_ratio: usize,
    /// Depthwise kernel multiplicity of separable convolutions.
    #[config(default = "2")]
    pub kernels_per_layer: usize,
    /// Hidden width of each direction of the bottleneck BiLSTM.
    #[config(default = "128")]
    pub lstm_hidden: usize,
    /// Width of the stem; each encoder stage doubles it.
    #[config(default = "64")]
    pub base_channels: usize,
}

/// Optional stages of a model, resolved from a [`Variant`].
#[derive(Config, Debug, PartialEq)]
pub struct StageLayout {
    /// Convolution flavour of every block.
    pub conv: ConvKind,
    /// CBAM on the four skip connections.
    pub skip_gates: bool,
    /// CBAM on the bottleneck feature map.
    pub bottleneck_gate: bool,
    /// BiLSTM attention on the bottleneck feature map.
    pub bottleneck_lstm: bool,
}

impl StageLayout {
    /// Whether any CBAM gate is present.
    pub const fn has_gates(&self) -> bool {
        self.skip_gates || self.bottleneck_gate
    }
}

impl ModelConfig {
    /// Validate the configuration and return appropriate errors for invalid settings.
    ///
    /// # Errors
    ///
    /// Returns `Err(UNetError::InvalidConfiguration)` if any validation rule is violated.
    pub fn validate(&self) -> UNetResult<()> {
        let layout = self.variant.layout();

        // 1. Widths must be non-zero
        for (name, value) in [
            ("in_channels", self.in_channels),
            ("out_channels", self.out_channels),
            ("base_channels", self.base_channels),
        ] {
            if value == 0 {
                return Err(UNetError::InvalidConfiguration {
                    reason: format!("{name} must be greater than 0"),
                });
            }
        }

        // 2. The bilinear path halves the bottleneck and every decoder output
        if self.base_channels % self.upsampling.factor() != 0 {
            return Err(UNetError::InvalidConfiguration {
                reason: format!(
                    "base_channels ({}) must be divisible by the upsampling factor ({})",
                    self.base_channels,
                    self.upsampling.factor()
                ),
            });
        }

        // 3. Separable convolutions need a kernel multiplicity
        if layout.conv == ConvKind::Separable && self.kernels_per_layer == 0 {
            return Err(UNetError::InvalidConfiguration {
                reason: "kernels_per_layer must be greater than 0".to_string(),
            });
        }

        // 4. The CBAM squeeze must divide every gated width
        if let Some(smallest) = self.smallest_gated_width() {
            if self.reduction_ratio == 0 {
                return Err(UNetError::InvalidConfiguration {
                    reason: "reduction_ratio must be greater than 0".to_string(),
                });
            }
            if smallest % self.reduction_ratio != 0 {
                return Err(UNetError::InvalidConfiguration {
                    reason: format!(
                        "reduction_ratio ({}) must divide the smallest gated width ({smallest})",
                        self.reduction_ratio
                    ),
                });
            }
        }

        // 5. Recurrent attention is only defined on the separable variants
        if layout.bottleneck_lstm {
            if layout.conv != ConvKind::Separable {
                return Err(UNetError::InvalidConfiguration {
                    reason: "bottleneck LSTM attention requires separable convolutions"
                        .to_string(),
                });
            }
            if self.lstm_hidden == 0 {
                return Err(UNetError::InvalidConfiguration {
                    reason: "lstm_hidden must be greater than 0".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Channel divisor of the bottleneck and decoder, 2 for bilinear upsampling.
    pub const fn factor(&self) -> usize {
        self.upsampling.factor()
    }

    /// Output width of the stem and of each encoder stage, bottleneck last.
    pub fn channel_schedule(&self) -> [usize; DEPTH + 1] {
        let b = self.base_channels;
        [b, b * 2, b * 4, b * 8, b * 16 / self.factor()]
    }

    /// `(in, out)` widths of the four decoder stages, deepest first.
    ///
    /// `in` is the width after concatenating the upsampled map with its skip.
    pub fn decoder_channels(&self) -> [(usize, usize); DEPTH] {
        let b = self.base_channels;
        let factor = self.factor();
        [
            (b * 16, b * 8 / factor),
            (b * 8, b * 4 / factor),
            (b * 4, b * 2 / factor),
            (b * 2, b),
        ]
    }

    /// Narrowest feature map that passes through a CBAM gate, if any.
    pub fn smallest_gated_width(&self) -> Option<usize> {
        let layout = self.variant.layout();
        if !layout.has_gates() {
            return None;
        }

        let schedule = self.channel_schedule();
        Some(if layout.skip_gates {
            schedule[0]
        } else {
            schedule[DEPTH]
        })
    }
}
