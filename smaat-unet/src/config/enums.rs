//! Enumeration types for model configuration.
//!
//! This module contains the enums that select convolution flavour, upsampling
//! mode and the named architecture variant.

use std::str::FromStr;

use burn::prelude::*;

use super::core::StageLayout;
use crate::error::UNetError;

/// Convolution flavour used by every `ConvBlock` in the network.
#[derive(Config, Debug, PartialEq)]
pub enum ConvKind {
    /// Full 3x3 convolutions.
    Standard,
    /// Depthwise 3x3 convolution followed by a pointwise 1x1 convolution.
    Separable,
}

/// How the decoder doubles spatial resolution.
#[derive(Config, Debug, PartialEq)]
pub enum Upsampling {
    /// Parameter-free bilinear interpolation. Halves the bottleneck width.
    Bilinear,
    /// Learned 2x2 transposed convolution with stride 2.
    Transposed,
}

impl Upsampling {
    /// Channel divisor applied to the bottleneck and decoder outputs.
    pub const fn factor(&self) -> usize {
        match self {
            Self::Bilinear => 2,
            Self::Transposed => 1,
        }
    }
}

/// Named architecture variants.
#[derive(Config, Debug, PartialEq)]
pub enum Variant {
    /// Plain UNet.
    Base,
    /// UNet with CBAM on every skip and on the bottleneck.
    Attention,
    /// UNet with depthwise-separable convolutions.
    Ds,
    /// SmaAt-UNet: separable convolutions, CBAM on skips and bottleneck.
    DsAttention,
    /// SmaAt-UNet with BiLSTM attention at the bottleneck.
    DsLstmAttention,
    /// SmaAt-UNet without the bottleneck CBAM.
    DsAttention4Cbams,
    /// An explicit stage layout.
    Custom(StageLayout),
}

impl Variant {
    /// The six named variants, in table order.
    pub const ALL: [Self; 6] = [
        Self::Base,
        Self::Attention,
        Self::Ds,
        Self::DsAttention,
        Self::DsLstmAttention,
        Self::DsAttention4Cbams,
    ];

    /// Class name used by the PyTorch training scripts.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Base => "UNet",
            Self::Attention => "UNet_Attention",
            Self::Ds => "UNetDS",
            Self::DsAttention => "UNetDS_Attention",
            Self::DsLstmAttention => "UNetDS_LSTM_Attention",
            Self::DsAttention4Cbams => "UNetDS_Attention_4CBAMs",
            Self::Custom(_) => "Custom",
        }
    }

    /// Optional stages present in this variant.
    pub fn layout(&self) -> StageLayout {
        let (conv, skip_gates, bottleneck_gate, bottleneck_lstm) = match self {
            Self::Base => (ConvKind::Standard, false, false, false),
            Self::Attention => (ConvKind::Standard, true, true, false),
            Self::Ds => (ConvKind::Separable, false, false, false),
            Self::DsAttention => (ConvKind::Separable, true, true, false),
            Self::DsLstmAttention => (ConvKind::Separable, true, true, true),
            Self::DsAttention4Cbams => (ConvKind::Separable, true, false, false),
            Self::Custom(layout) => return layout.clone(),
        };
        StageLayout::new(conv, skip_gates, bottleneck_gate, bottleneck_lstm)
    }
}

impl FromStr for Variant {
    type Err = UNetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(variant) = Self::ALL.iter().find(|v| v.name() == s) {
            return Ok(variant.clone());
        }

        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "base" | "unet" => Ok(Self::Base),
            "attention" | "unet_attention" => Ok(Self::Attention),
            "ds" | "unetds" => Ok(Self::Ds),
            "ds_attention" | "unetds_attention" | "smaat" => Ok(Self::DsAttention),
            "ds_lstm_attention" | "unetds_lstm_attention" => Ok(Self::DsLstmAttention),
            "ds_attention_4cbams" | "unetds_attention_4cbams" => Ok(Self::DsAttention4Cbams),
            _ => Err(UNetError::InvalidConfiguration {
                reason: format!("Unknown variant: {s}"),
            }),
        }
    }
}
