//! Stacked ConvLSTM Layer
//!
//! Full recurrent layer that applies one [`ConvLSTMCell`] per layer across a
//! sequence of feature maps, threading (hidden, cell) state through time and
//! feeding each layer's hidden sequence to the next layer.

use burn::module::Module;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::cells::{ConvLSTMCell, ConvLstmState};
use crate::config::ConvLstmConfig;
use crate::error::{self, ConvLstmError};
use crate::init::WeightInit;

/// Stacked ConvLSTM
///
/// Layer 0 consumes the raw input channels; every later layer consumes the
/// hidden sequence of the layer below it. All layers share `num_features`
/// and `filter_size`.
///
/// # Type Parameters
/// * `B` - The backend type
#[derive(Module, Debug)]
pub struct ConvLSTM<B: Backend> {
    /// One cell per layer, in layer order
    cells: Vec<ConvLSTMCell<B>>,
    input_channels: usize,
    num_features: usize,
    filter_size: usize,
    num_layers: usize,
}

impl<B: Backend> ConvLSTM<B> {
    /// Create a new stacked ConvLSTM
    ///
    /// # Arguments
    /// * `input_channels` - Channels of the input frames
    /// * `num_features` - Channels of the hidden and cell states of every layer
    /// * `filter_size` - Height and width of the gate convolution filters (odd)
    /// * `num_layers` - Number of stacked layers
    /// * `device` - Device to create the module on
    ///
    /// # Panics
    /// If `filter_size` is even or any count is zero. Use
    /// [`ConvLstmConfig::try_init`] to get an error instead.
    pub fn new(
        input_channels: usize,
        num_features: usize,
        filter_size: usize,
        num_layers: usize,
        device: &B::Device,
    ) -> Self {
        ConvLstmConfig::new(input_channels, num_features, filter_size, num_layers).init(device)
    }

    pub(crate) fn from_cells(cells: Vec<ConvLSTMCell<B>>) -> Self {
        let input_channels = cells.first().map_or(0, |c| c.input_channels());
        let num_features = cells.first().map_or(0, |c| c.num_features());
        let filter_size = cells.first().map_or(0, |c| c.filter_size());
        let num_layers = cells.len();

        Self {
            cells,
            input_channels,
            num_features,
            filter_size,
            num_layers,
        }
    }

    /// Reinitialize the gate convolution of every layer
    pub fn apply_weight_init(mut self, init: &WeightInit) -> Self {
        self.cells = self
            .cells
            .into_iter()
            .map(|cell| cell.apply_weight_init(init))
            .collect();
        self
    }

    /// Cells in layer order
    pub fn cells(&self) -> &[ConvLSTMCell<B>] {
        &self.cells
    }

    pub fn input_channels(&self) -> usize {
        self.input_channels
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn filter_size(&self) -> usize {
        self.filter_size
    }

    pub fn num_layers(&self) -> usize {
        self.num_layers
    }

    /// Zero state for every layer
    ///
    /// # Arguments
    /// * `input` - Batch-first sequence `[batch, seq, channels, height, width]`
    pub fn init_hidden(&self, input: &Tensor<B, 5>) -> Vec<ConvLstmState<B>> {
        let [batch_size, _, _, height, width] = input.dims();
        self.zero_states(batch_size, height, width, &input.device())
    }

    fn zero_states(
        &self,
        batch_size: usize,
        height: usize,
        width: usize,
        device: &B::Device,
    ) -> Vec<ConvLstmState<B>> {
        (0..self.num_layers)
            .map(|_| ConvLstmState::zeros([batch_size, self.num_features, height, width], device))
            .collect()
    }

    /// Forward pass through all layers
    ///
    /// # Arguments
    /// * `input` - Batch-first sequence `[batch, seq, input_channels, height, width]`
    /// * `state` - Optional initial state per layer, each `[batch, num_features, height, width]`
    ///
    /// # Returns
    /// Tuple of (final_states, output) where:
    /// - final_states: one (hidden, cell) pair per layer after the last timestep
    /// - output: time-major hidden sequence of the last layer,
    ///   `[seq, batch, num_features, height, width]`
    ///
    /// # Panics
    /// On an empty sequence, a state list whose length is not `num_layers`,
    /// or any dimension mismatch inside the cells.
    pub fn forward(
        &self,
        input: Tensor<B, 5>,
        state: Option<Vec<ConvLstmState<B>>>,
    ) -> (Vec<ConvLstmState<B>>, Tensor<B, 5>) {
        // [batch, seq, C, H, W] -> [seq, batch, C, H, W]
        let mut current = input.swap_dims(0, 1);
        let [seq_len, batch_size, _, height, width] = current.dims();
        assert!(seq_len > 0, "{}", ConvLstmError::EmptySequence);

        let states = state
            .unwrap_or_else(|| self.zero_states(batch_size, height, width, &current.device()));
        assert_eq!(
            states.len(),
            self.num_layers,
            "one initial state is required per layer"
        );

        let mut final_states = Vec::with_capacity(self.num_layers);

        for (cell, initial) in self.cells.iter().zip(states) {
            let mut outputs: Vec<Tensor<B, 4>> = Vec::with_capacity(seq_len);

            // Each step depends on the previous one, so this stays a strict fold over time
            let last = (0..seq_len).fold(initial, |state, t| {
                let step_input = current.clone().narrow(0, t, 1).squeeze::<4>(0);
                let next = cell.forward(step_input, state);
                outputs.push(next.hidden.clone());
                next
            });

            final_states.push(last);
            current = Tensor::stack(outputs, 0);
        }

        (final_states, current)
    }

    /// Same as [`forward`](Self::forward), but validates shapes first
    pub fn try_forward(
        &self,
        input: Tensor<B, 5>,
        state: Option<Vec<ConvLstmState<B>>>,
    ) -> error::Result<(Vec<ConvLstmState<B>>, Tensor<B, 5>)> {
        let dims = input.dims();
        let [batch_size, seq_len, channels, height, width] = dims;

        if seq_len == 0 {
            return Err(ConvLstmError::EmptySequence);
        }
        if channels != self.input_channels {
            return Err(ConvLstmError::ShapeMismatch {
                context: "sequence input",
                expected: vec![batch_size, seq_len, self.input_channels, height, width],
                actual: dims.to_vec(),
            });
        }

        if let Some(states) = &state {
            if states.len() != self.num_layers {
                return Err(ConvLstmError::StateCount {
                    expected: self.num_layers,
                    actual: states.len(),
                });
            }
            let expected = [batch_size, self.num_features, height, width];
            for layer_state in states {
                for dims in [layer_state.hidden.dims(), layer_state.cell.dims()] {
                    if dims != expected {
                        return Err(ConvLstmError::ShapeMismatch {
                            context: "layer state",
                            expected: expected.to_vec(),
                            actual: dims.to_vec(),
                        });
                    }
                }
            }
        }

        Ok(self.forward(input, state))
    }
}
