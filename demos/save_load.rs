//! Save and Load Example
//!
//! Saves a ConvLSTM's parameters and its configuration, rebuilds the model
//! from the configuration and reloads the parameters.

use burn::backend::NdArray;
use burn::config::Config;
use burn::tensor::{Distribution, Tensor};
use convlstm::checkpoint;
use convlstm::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Model Save/Load Example ===\n");

    type Backend = NdArray<f32>;
    let device = Default::default();

    let dir = std::env::temp_dir().join("convlstm-save-load");
    std::fs::create_dir_all(&dir)?;

    let config = ConvLstmConfig::new(3, 8, 3, 2);
    let model = config.init::<Backend>(&device);

    config.save(dir.join("config.json"))?;
    checkpoint::save(&model, dir.join("model"))?;
    println!("Saved config and parameters to {}", dir.display());

    let config = ConvLstmConfig::load(dir.join("config.json"))?;
    let restored = checkpoint::load(config.init::<Backend>(&device), dir.join("model"), &device)?;
    println!("Reloaded a {}-layer model", restored.num_layers());

    let input = Tensor::<Backend, 5>::random([1, 4, 3, 16, 16], Distribution::Default, &device);
    let (_, expected) = model.forward(input.clone(), None);
    let (_, actual) = restored.forward(input, None);

    let diff = (expected - actual).abs().max().into_scalar();
    println!("Max output difference after reload: {}", diff);

    println!("\n=== Save/Load Example completed! ===");
    Ok(())
}
