//! Construction configuration for [`ConvLSTM`].
//!
//! The device is never part of the configuration; it is passed to
//! [`ConvLstmConfig::init`] so the same config can build modules on any
//! backend device.

use burn::config::Config;
use burn::tensor::backend::Backend;

use crate::cells::ConvLSTMCell;
use crate::error::{self, ConvLstmError};
use crate::init::WeightInit;
use crate::rnn::ConvLSTM;

/// Configuration of a stacked ConvLSTM
#[derive(Config, Debug)]
pub struct ConvLstmConfig {
    /// Channels of the raw input frames
    pub input_channels: usize,
    /// Channels of every layer's hidden and cell state
    pub num_features: usize,
    /// Height and width of the gate convolution filters (must be odd)
    pub filter_size: usize,
    /// Number of stacked layers
    pub num_layers: usize,
    /// Whether gate convolutions carry a bias
    #[config(default = "true")]
    pub bias: bool,
    /// Optional initialization applied right after construction
    #[config(default = "None")]
    pub weight_init: Option<WeightInit>,
}

impl ConvLstmConfig {
    /// Check the invariants the layered processor relies on
    pub fn validate(&self) -> error::Result<()> {
        if self.filter_size == 0 || self.filter_size % 2 == 0 {
            return Err(ConvLstmError::InvalidConfig(format!(
                "filter_size must be odd to preserve spatial size, got {}",
                self.filter_size
            )));
        }
        if self.num_layers == 0 {
            return Err(ConvLstmError::InvalidConfig(
                "num_layers must be at least 1".to_string(),
            ));
        }
        if self.input_channels == 0 || self.num_features == 0 {
            return Err(ConvLstmError::InvalidConfig(format!(
                "channel counts must be positive (input_channels={}, num_features={})",
                self.input_channels, self.num_features
            )));
        }
        Ok(())
    }

    /// Build the module on `device`, rejecting invalid configurations
    pub fn try_init<B: Backend>(&self, device: &B::Device) -> error::Result<ConvLSTM<B>> {
        self.validate()?;

        let cells = (0..self.num_layers)
            .map(|layer| {
                // Only the first layer sees the raw input channels
                let input_channels = if layer == 0 {
                    self.input_channels
                } else {
                    self.num_features
                };
                ConvLSTMCell::with_conv_bias(
                    input_channels,
                    self.filter_size,
                    self.num_features,
                    self.bias,
                    device,
                )
            })
            .collect();

        tracing::debug!(
            input_channels = self.input_channels,
            num_features = self.num_features,
            filter_size = self.filter_size,
            num_layers = self.num_layers,
            "initialized ConvLSTM"
        );

        let model = ConvLSTM::from_cells(cells);
        Ok(match &self.weight_init {
            Some(init) => model.apply_weight_init(init),
            None => model,
        })
    }

    /// Build the module on `device`
    ///
    /// # Panics
    /// If the configuration fails [`validate`](Self::validate).
    pub fn init<B: Backend>(&self, device: &B::Device) -> ConvLSTM<B> {
        match self.try_init(device) {
            Ok(model) => model,
            Err(err) => panic!("{}", err),
        }
    }
}
