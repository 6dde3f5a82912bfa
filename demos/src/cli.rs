//! Command-line arguments shared by every demo.

use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::config::Config;
use clap::Args;
use smaat_unet::{ModelConfig, Upsampling, Variant};

use crate::backend::{select_device, SelectedDevice, BACKEND_NAME};

/// Device selection for the compiled-in backend.
#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// Device ordinal on GPU backends
    #[arg(long = "device", default_value_t = 0)]
    pub ordinal: usize,
}

impl DeviceArgs {
    pub fn device(&self) -> SelectedDevice {
        let device = select_device(self.ordinal);
        tracing::info!(backend = BACKEND_NAME, ?device, "device ready");
        device
    }
}

/// Model hyperparameters, read from a JSON file and/or flags.
///
/// Flags override values loaded with `--config`.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// JSON model configuration written by `ModelConfig::save`
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Variant, by class name (`UNetDS_Attention`) or snake case (`ds_attention`)
    #[arg(short, long)]
    pub variant: Option<Variant>,

    /// Number of input frames
    #[arg(long)]
    pub in_channels: Option<usize>,

    /// Number of predicted maps
    #[arg(long)]
    pub out_channels: Option<usize>,

    /// Use transposed convolutions instead of bilinear upsampling
    #[arg(long)]
    pub transposed: bool,

    /// Width of the stem
    #[arg(long)]
    pub base_channels: Option<usize>,

    /// CBAM channel reduction ratio
    #[arg(long)]
    pub reduction_ratio: Option<usize>,

    /// Depthwise kernels per input channel
    #[arg(long)]
    pub kernels_per_layer: Option<usize>,

    /// Hidden width of each BiLSTM direction
    #[arg(long)]
    pub lstm_hidden: Option<usize>,
}

impl ModelArgs {
    /// Resolves the final configuration and validates it.
    pub fn model_config(&self) -> Result<ModelConfig> {
        let config = self.resolve()?;
        config.validate()?;
        Ok(config)
    }

    /// Resolves the final configuration without validating it.
    pub fn resolve(&self) -> Result<ModelConfig> {
        let mut config = match &self.config {
            Some(path) => ModelConfig::load(path)
                .with_context(|| format!("cannot read model configuration {}", path.display()))?,
            None => ModelConfig::new(),
        };

        if let Some(variant) = &self.variant {
            config.variant = variant.clone();
        }
        if self.transposed {
            config.upsampling = Upsampling::Transposed;
        }
        let overrides = [
            (&mut config.in_channels, self.in_channels),
            (&mut config.out_channels, self.out_channels),
            (&mut config.base_channels, self.base_channels),
            (&mut config.reduction_ratio, self.reduction_ratio),
            (&mut config.kernels_per_layer, self.kernels_per_layer),
            (&mut config.lstm_hidden, self.lstm_hidden),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }

        Ok(config)
    }
}

/// Spatial size of the synthetic input batch.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Batch size
    #[arg(short, long, default_value_t = 1)]
    pub batch: usize,

    /// Height and width; must be a multiple of 16
    #[arg(short, long, default_value_t = 288)]
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        device: DeviceArgs,
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = TestCli::parse_from([
            "test",
            "--variant",
            "UNetDS_LSTM_Attention",
            "--in-channels",
            "6",
            "--transposed",
            "--lstm-hidden",
            "32",
        ]);
        let config = cli.model.model_config().unwrap();

        assert_eq!(config.variant, Variant::DsLstmAttention);
        assert_eq!(config.in_channels, 6);
        assert_eq!(config.upsampling, Upsampling::Transposed);
        assert_eq!(config.lstm_hidden, 32);
        assert_eq!(config.base_channels, 64);
    }

    #[test]
    fn test_invalid_flags_are_rejected() {
        let cli = TestCli::parse_from(["test", "--variant", "base", "--base-channels", "0"]);

        assert!(cli.model.model_config().is_err());
        assert!(TestCli::try_parse_from(["test", "--variant", "resnet"]).is_err());
    }

    #[test]
    fn test_resolve_defers_validation() {
        // A ratio of 16 cannot gate an 8-wide stem, but ungated variants are fine.
        let cli = TestCli::parse_from([
            "test",
            "--variant",
            "attention",
            "--base-channels",
            "8",
        ]);

        assert!(cli.model.model_config().is_err());
        let config = cli.model.resolve().unwrap();
        assert_eq!(config.base_channels, 8);
        assert!(config.with_variant(Variant::Ds).validate().is_ok());
    }

    #[test]
    fn test_device_ordinal_flag() {
        assert_eq!(TestCli::parse_from(["test"]).device.ordinal, 0);
        assert_eq!(TestCli::parse_from(["test", "--device", "2"]).device.ordinal, 2);
        assert!(TestCli::try_parse_from(["test", "--device", "-1"]).is_err());
    }

    #[cfg(not(any(feature = "cuda", feature = "wgpu")))]
    #[test]
    fn test_cpu_backend_ignores_ordinal() {
        use burn::backend::ndarray::NdArrayDevice;

        let cli = TestCli::parse_from(["test", "--device", "3"]);
        assert_eq!(cli.device.device(), NdArrayDevice::Cpu);
    }
}
