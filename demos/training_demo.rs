//! Training Demo
//!
//! Trains a single-layer ConvLSTM to map random frames to a target sequence
//! with SGD, weight/bias parameter groups and global-norm gradient clipping.
//!
//! Run with `RUST_LOG=info` to see per-epoch losses.

use burn::backend::{Autodiff, NdArray};
use burn::tensor::{Distribution, Tensor};
use convlstm::prelude::*;

fn main() -> Result<(), ConvLstmError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== ConvLSTM Training Example ===\n");

    type Backend = Autodiff<NdArray<f32>>;
    let device = Default::default();

    let channels = 3;
    let batch_size = 4;
    let seq_len = 4;
    let (height, width) = (16, 16);

    let model = ConvLstmConfig::new(channels, channels, 5, 1)
        .with_weight_init(Some(WeightInit::new()))
        .init::<Backend>(&device);

    let input = Tensor::<Backend, 5>::random(
        [batch_size, seq_len, channels, height, width],
        Distribution::Uniform(0.0, 1.0),
        &device,
    );
    let target = Tensor::<Backend, 5>::random(
        [batch_size, seq_len, channels, height, width],
        Distribution::Uniform(0.0, 1.0),
        &device,
    );

    let config = TrainingConfig::new().with_epochs(20);
    println!("Training setup:");
    println!("  Weight lr: {}", ParamGroup::Weight.learning_rate(&config));
    println!("  Bias lr:   {}", ParamGroup::Bias.learning_rate(&config));
    println!("  Clip norm: {}", config.clip_norm);
    println!();

    let (model, summary) = fit(model, input, target, &config)?;

    println!("Epoch losses:");
    for (epoch, loss) in summary.epoch_losses.iter().enumerate() {
        println!("  {:>3}: {:.6}", epoch, loss);
    }
    println!("Clipped steps: {}", summary.clipped_steps);
    println!("Final loss: {:?}", summary.final_loss());
    println!("Layers trained: {}", model.num_layers());

    println!("\n=== Training Example completed! ===");
    Ok(())
}
