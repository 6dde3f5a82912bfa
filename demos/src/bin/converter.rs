use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use smaat_unet::{load_pytorch_weights, save_checkpoint, UNet};
use smaat_unet_demos::{
    backend::SelectedBackend,
    cli::{DeviceArgs, ModelArgs},
    init_tracing,
};

/// Convert a PyTorch state dict into a Burn checkpoint directory.
#[derive(Parser, Debug)]
#[command(name = "converter")]
struct Cli {
    /// PyTorch `.pt`/`.ckpt` file
    #[arg(short, long)]
    input: PathBuf,

    /// Output checkpoint directory
    #[arg(short, long)]
    output: PathBuf,

    /// Key holding the weights, `state_dict` for Lightning checkpoints
    #[arg(long)]
    top_level_key: Option<String>,

    #[command(flatten)]
    model: ModelArgs,

    #[command(flatten)]
    device: DeviceArgs,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let device = cli.device.device();
    let config = cli.model.model_config()?;
    tracing::info!(
        input = %cli.input.display(),
        variant = config.variant.name(),
        "converting"
    );

    let model: UNet<SelectedBackend> =
        load_pytorch_weights(&config, &cli.input, cli.top_level_key.as_deref(), &device)
            .with_context(|| format!("cannot import {}", cli.input.display()))?;
    save_checkpoint(model, &config, &cli.output)?;

    tracing::info!(output = %cli.output.display(), "checkpoint written");
    Ok(())
}
