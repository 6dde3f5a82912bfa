use anyhow::Result;
use burn::prelude::*;
use clap::Parser;
use smaat_unet::UNetConfig;
use smaat_unet_demos::{
    backend::SelectedBackend,
    cli::{DeviceArgs, InputArgs, ModelArgs},
    init_tracing,
};

/// Time repeated forward passes on a zero input.
#[derive(Parser, Debug)]
#[command(name = "bench")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    #[command(flatten)]
    device: DeviceArgs,

    #[command(flatten)]
    input: InputArgs,

    /// Timed iterations
    #[arg(short, long, default_value_t = 20)]
    iterations: usize,

    /// Untimed iterations run first
    #[arg(long, default_value_t = 2)]
    warmup: usize,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let device = cli.device.device();
    let config = cli.model.model_config()?;
    let model = UNetConfig::new(config.clone()).init::<SelectedBackend>(&device)?;
    tracing::info!(
        variant = config.variant.name(),
        batch = cli.input.batch,
        size = cli.input.size,
        "benchmarking"
    );

    let shape = [cli.input.batch, config.in_channels, cli.input.size, cli.input.size];
    for _ in 0..cli.warmup {
        let x = Tensor::<SelectedBackend, 4>::zeros(shape, &device);
        let _ = model.forward(x)?.into_data();
    }

    let start = std::time::Instant::now();
    let mut result = Vec::with_capacity(cli.iterations);
    for _ in 0..cli.iterations {
        let start_ = std::time::Instant::now();
        let x = Tensor::<SelectedBackend, 4>::zeros(shape, &device);
        // Reading the output back waits for asynchronous backends.
        let _ = model.forward(x)?.into_data();
        result.push(start_.elapsed());
    }
    let total = start.elapsed();

    println!(
        "Total time: {:?}, Speed: {:.2} it/s",
        total,
        cli.iterations as f32 / total.as_secs_f32()
    );
    println!("{:?}", result);

    Ok(())
}
