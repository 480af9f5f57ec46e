//! Basic ConvLSTM Example
//!
//! Builds a stacked ConvLSTM, inspects its parameters and runs a forward pass
//! over a random batch of frame sequences.

use burn::backend::NdArray;
use burn::module::Module;
use burn::tensor::{Distribution, Tensor};
use convlstm::prelude::*;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== ConvLSTM Basic Example ===\n");

    type Backend = NdArray<f32>;
    let device = Default::default();

    let num_features = 3;
    let filter_size = 5;
    let batch_size = 10;
    let (height, width) = (25, 25);
    let input_channels = 3;
    let num_layers = 1;
    let seq_len = 4;

    let model = ConvLstmConfig::new(input_channels, num_features, filter_size, num_layers)
        .with_weight_init(Some(WeightInit::new()))
        .init::<Backend>(&device);

    println!("Model:");
    println!("  Input channels: {}", model.input_channels());
    println!("  Features: {}", model.num_features());
    println!("  Filter size: {}", model.filter_size());
    println!("  Layers: {}", model.num_layers());
    println!("  Parameters: {}", model.num_params());
    println!();

    for (layer, cell) in model.cells().iter().enumerate() {
        let weight = cell.conv().weight.val();
        println!(
            "  layer {} weight {:?} mean {:.5}",
            layer,
            weight.dims(),
            weight.clone().mean().into_scalar()
        );
    }
    println!();

    // [batch, seq_len, channels, height, width]
    let input = Tensor::<Backend, 5>::random(
        [batch_size, seq_len, input_channels, height, width],
        Distribution::Uniform(0.0, 1.0),
        &device,
    );

    let hidden = model.init_hidden(&input);
    println!("Initial state:");
    println!("  Layers: {}", hidden.len());
    println!("  Hidden shape: {:?}", hidden[0].hidden.dims());
    println!();

    let (states, output) = model.forward(input, None);
    println!("Forward pass:");
    println!("  Output shape (time-major): {:?}", output.dims());
    println!("  Final states: {}", states.len());
    println!("  Next hidden shape: {:?}", states[0].hidden.dims());

    println!("\n=== Basic example completed! ===");
}
