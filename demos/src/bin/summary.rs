use anyhow::Result;
use burn::prelude::*;
use clap::Parser;
use serde::Serialize;
use smaat_unet::{UNetConfig, Variant};
use smaat_unet_demos::{
    backend::SelectedBackend,
    cli::{DeviceArgs, ModelArgs},
    init_tracing,
};

/// Print the channel schedule and parameter count of every variant.
///
/// Model flags apply to all variants; `--variant` is ignored and variants
/// the flags are invalid for are skipped.
#[derive(Parser, Debug)]
#[command(name = "summary")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    #[command(flatten)]
    device: DeviceArgs,

    /// Print a JSON document instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct VariantSummary {
    variant: &'static str,
    parameters: usize,
    schedule: Vec<usize>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let device = cli.device.device();
    let base = cli.model.resolve()?;

    let mut rows = Vec::with_capacity(Variant::ALL.len());
    for variant in Variant::ALL {
        let config = base.clone().with_variant(variant.clone());
        match UNetConfig::new(config.clone()).init::<SelectedBackend>(&device) {
            Ok(model) => rows.push(VariantSummary {
                variant: variant.name(),
                parameters: model.num_params(),
                schedule: config.channel_schedule().to_vec(),
            }),
            Err(err) => tracing::warn!(variant = variant.name(), %err, "skipped"),
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:<26} {:>12}  schedule", "variant", "parameters");
    for row in &rows {
        println!(
            "{:<26} {:>12}  {:?}",
            row.variant, row.parameters, row.schedule
        );
    }

    Ok(())
}
