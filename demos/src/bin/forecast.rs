use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    tensor::{Distribution, ElementConversion},
};
use clap::Parser;
use smaat_unet::{load_checkpoint, save_checkpoint, UNet, UNetConfig};
use smaat_unet_demos::{
    backend::SelectedBackend,
    cli::{DeviceArgs, InputArgs, ModelArgs},
    init_tracing,
};

/// Run one forecast on a synthetic radar sequence.
#[derive(Parser, Debug)]
#[command(name = "forecast")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    #[command(flatten)]
    device: DeviceArgs,

    #[command(flatten)]
    input: InputArgs,

    /// Checkpoint directory to load (`config.json` + `model.mpk`); overrides model flags
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Write the model used for the forecast to this checkpoint directory
    #[arg(long)]
    save: Option<PathBuf>,

    /// Seed for the synthetic input
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let device = cli.device.device();

    let (config, model): (_, UNet<SelectedBackend>) = match &cli.checkpoint {
        Some(directory) => load_checkpoint(directory, &device)
            .with_context(|| format!("cannot load checkpoint {}", directory.display()))?,
        None => {
            let config = cli.model.model_config()?;
            let model = UNetConfig::new(config.clone()).init(&device)?;
            (config, model)
        }
    };
    tracing::info!(
        variant = config.variant.name(),
        parameters = model.num_params(),
        "model ready"
    );

    SelectedBackend::seed(cli.seed);
    let frames = Tensor::<SelectedBackend, 4>::random(
        [cli.input.batch, config.in_channels, cli.input.size, cli.input.size],
        Distribution::Uniform(0.0, 1.0),
        &device,
    );

    let start = std::time::Instant::now();
    let forecast = model.forward(frames)?;
    let elapsed = start.elapsed();

    let dims = forecast.dims();
    let min = forecast.clone().min().into_scalar().elem::<f32>();
    let max = forecast.clone().max().into_scalar().elem::<f32>();
    let mean = forecast.mean().into_scalar().elem::<f32>();
    tracing::info!(?dims, min, max, mean, ?elapsed, "forecast done");

    if let Some(directory) = &cli.save {
        save_checkpoint(model, &config, directory)?;
        tracing::info!(path = %directory.display(), "checkpoint saved");
    }

    Ok(())
}
