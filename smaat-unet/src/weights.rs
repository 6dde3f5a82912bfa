//! # Weight Persistence
//!
//! Saving and restoring trained models as Burn records, and (with the
//! `pretrained` feature) importing state dicts exported by the PyTorch
//! SmaAt-UNet models.

use std::path::Path;

use burn::{
    config::Config,
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
    tensor::backend::Backend,
};

use crate::{
    config::ModelConfig,
    error::{UNetError, UNetResult},
    models::{UNet, UNetConfig},
};

const CONFIG_FILE: &str = "config.json";
const MODEL_FILE: &str = "model";

impl<B: Backend> UNet<B> {
    /// Saves the parameters as a named MessagePack record.
    ///
    /// The `.mpk` extension is appended to `path`.
    pub fn save_weights(self, path: &Path) -> UNetResult<()> {
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        self.save_file(path.to_path_buf(), &recorder)
            .map_err(|e| UNetError::WeightSavingFailed {
                reason: format!("MessagePack record saving failed: {e}"),
            })
    }

    /// Loads parameters saved by [`UNet::save_weights`] into this model.
    ///
    /// The model must have been built from the same configuration.
    pub fn load_weights(self, path: &Path, device: &B::Device) -> UNetResult<Self> {
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        self.load_file(path.to_path_buf(), &recorder, device)
            .map_err(|e| UNetError::WeightLoadingFailed {
                reason: format!("MessagePack record loading failed: {e}"),
            })
    }
}

/// Writes `config.json` and `model.mpk` into `directory`.
///
/// # Errors
///
/// Returns `UNetError::WeightSavingFailed` if the directory or either file
/// cannot be written.
pub fn save_checkpoint<B: Backend>(
    model: UNet<B>,
    config: &ModelConfig,
    directory: &Path,
) -> UNetResult<()> {
    std::fs::create_dir_all(directory).map_err(|e| UNetError::WeightSavingFailed {
        reason: format!("cannot create {}: {e}", directory.display()),
    })?;
    config
        .save(directory.join(CONFIG_FILE))
        .map_err(|e| UNetError::WeightSavingFailed {
            reason: format!("configuration saving failed: {e}"),
        })?;

    model.save_weights(&directory.join(MODEL_FILE))
}

/// Rebuilds a model from a directory written by [`save_checkpoint`].
pub fn load_checkpoint<B: Backend>(
    directory: &Path,
    device: &B::Device,
) -> UNetResult<(ModelConfig, UNet<B>)> {
    let config = ModelConfig::load(directory.join(CONFIG_FILE)).map_err(|e| {
        UNetError::WeightLoadingFailed {
            reason: format!("configuration loading failed: {e}"),
        }
    })?;

    let model = UNetConfig::new(config.clone())
        .init(device)?
        .load_weights(&directory.join(MODEL_FILE), device)?;

    Ok((config, model))
}

#[cfg(feature = "pretrained")]
mod pytorch {
    use std::path::Path;

    use burn::{
        module::Module,
        record::{FullPrecisionSettings, Recorder},
        tensor::backend::Backend,
    };
    use burn_import::pytorch::{LoadArgs, PyTorchFileRecorder};

    use crate::{
        config::{ModelConfig, DEPTH},
        error::{UNetError, UNetResult},
        models::{UNet, UNetConfig, UNetRecord},
    };

    /// Maps PyTorch module names onto this crate's module tree.
    fn load_args(path: &Path, top_level_key: Option<&str>) -> LoadArgs {
        let mut args = LoadArgs::new(path.to_path_buf())
            .with_key_remap(r"^inc\.", "encoder.stem.")
            .with_key_remap(r"^cbam5\.", "bottleneck.gate.")
            .with_key_remap(r"^outc\.conv\.", "outc.");

        for stage in 1..=DEPTH {
            let index = stage - 1;
            args = args
                .with_key_remap(
                    &format!(r"^down{stage}\.maxpool_conv\.1\."),
                    &format!("encoder.downs.{index}.conv."),
                )
                .with_key_remap(
                    &format!(r"^cbam{stage}\."),
                    &format!("encoder.skip_gates.{index}."),
                )
                .with_key_remap(
                    &format!(r"^up{stage}\.up\."),
                    &format!("decoder.ups.{index}.upsample."),
                )
                .with_key_remap(
                    &format!(r"^up{stage}\.conv\."),
                    &format!("decoder.ups.{index}.conv."),
                );
        }

        // DoubleConv sequential: conv, bn, relu, conv, bn, relu
        args = args
            .with_key_remap(r"\.double_conv\.0\.", ".conv_in.")
            .with_key_remap(r"\.double_conv\.1\.", ".bn_in.")
            .with_key_remap(r"\.double_conv\.3\.", ".conv_out.")
            .with_key_remap(r"\.double_conv\.4\.", ".bn_out.")
            // CBAM channel MLP sequential: flatten, linear, relu, linear
            .with_key_remap(r"\.channel_att\.MLP\.1\.", ".channel.squeeze.")
            .with_key_remap(r"\.channel_att\.MLP\.3\.", ".channel.excite.")
            .with_key_remap(r"\.spatial_att\.", ".spatial.");

        match top_level_key {
            Some(key) => args.with_top_level_key(key),
            None => args,
        }
    }

    /// Builds a model for `config` and fills it from a PyTorch state dict.
    ///
    /// Lightning checkpoints keep the weights under `state_dict`; pass it as
    /// `top_level_key`.
    ///
    /// # Errors
    ///
    /// Returns `UNetError::WeightLoadingFailed` for the recurrent variant, which
    /// has no published checkpoint, or when the file cannot be read or mapped.
    pub fn load_pytorch_weights<B: Backend>(
        config: &ModelConfig,
        path: &Path,
        top_level_key: Option<&str>,
        device: &B::Device,
    ) -> UNetResult<UNet<B>> {
        if config.variant.layout().bottleneck_lstm {
            return Err(UNetError::WeightLoadingFailed {
                reason: format!(
                    "no PyTorch weight mapping for variant {}",
                    config.variant.name()
                ),
            });
        }

        let model = UNetConfig::new(config.clone()).init(device)?;

        tracing::debug!(path = %path.display(), ?top_level_key, "importing PyTorch weights");
        let record: UNetRecord<B> = PyTorchFileRecorder::<FullPrecisionSettings>::default()
            .load(load_args(path, top_level_key), device)
            .map_err(|e| UNetError::WeightLoadingFailed {
                reason: format!("PyTorch model loading failed: {e}"),
            })?;

        Ok(model.load_record(record))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn remap(args: &LoadArgs, key: &str) -> String {
            args.key_remap
                .iter()
                .fold(key.to_string(), |name, (pattern, replacement)| {
                    pattern.replace_all(&name, replacement.as_str()).into_owned()
                })
        }

        #[test]
        fn test_state_dict_keys_map_onto_module_tree() {
            let args = load_args(Path::new("model.ckpt"), Some("state_dict"));
            assert_eq!(args.top_level_key.as_deref(), Some("state_dict"));

            let cases = [
                ("inc.double_conv.0.weight", "encoder.stem.conv_in.weight"),
                (
                    "inc.double_conv.3.depthwise.weight",
                    "encoder.stem.conv_out.depthwise.weight",
                ),
                (
                    "down2.maxpool_conv.1.double_conv.4.running_mean",
                    "encoder.downs.1.conv.bn_out.running_mean",
                ),
                (
                    "cbam1.channel_att.MLP.1.weight",
                    "encoder.skip_gates.0.channel.squeeze.weight",
                ),
                (
                    "cbam4.spatial_att.conv.weight",
                    "encoder.skip_gates.3.spatial.conv.weight",
                ),
                ("cbam5.channel_att.MLP.3.bias", "bottleneck.gate.channel.excite.bias"),
                ("up1.up.weight", "decoder.ups.0.upsample.weight"),
                (
                    "up4.conv.double_conv.1.running_var",
                    "decoder.ups.3.conv.bn_in.running_var",
                ),
                ("outc.conv.bias", "outc.bias"),
            ];

            for (key, expected) in cases {
                assert_eq!(remap(&args, key), expected, "{key}");
            }
        }

        #[test]
        fn test_top_level_key_is_optional() {
            let args = load_args(Path::new("model.pt"), None);

            assert!(args.top_level_key.is_none());
        }
    }
}

#[cfg(feature = "pretrained")]
pub use pytorch::load_pytorch_weights;
