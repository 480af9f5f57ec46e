use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::PaddingConfig2d;
use burn::tensor::activation;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::{self, ConvLstmError};
use crate::init::{Reinitialize, WeightInit};

/// Hidden activation map and cell memory map of one ConvLSTM layer.
///
/// Both tensors have shape `[batch, num_features, height, width]`.
#[derive(Clone, Debug)]
pub struct ConvLstmState<B: Backend> {
    pub hidden: Tensor<B, 4>,
    pub cell: Tensor<B, 4>,
}

impl<B: Backend> ConvLstmState<B> {
    pub fn new(hidden: Tensor<B, 4>, cell: Tensor<B, 4>) -> Self {
        Self { hidden, cell }
    }

    /// All-zero state of shape `[batch, num_features, height, width]`
    pub fn zeros(shape: [usize; 4], device: &B::Device) -> Self {
        Self {
            hidden: Tensor::zeros(shape, device),
            cell: Tensor::zeros(shape, device),
        }
    }

    pub fn dims(&self) -> [usize; 4] {
        self.hidden.dims()
    }

    /// Cut the autodiff graph so the state can be carried into a later step
    pub fn detach(self) -> Self {
        Self {
            hidden: self.hidden.detach(),
            cell: self.cell.detach(),
        }
    }
}

/// Convolutional LSTM cell
///
/// Implements the LSTM equations with every gate projection computed by a
/// single 2-D convolution over the channel-wise concatenation `[x, h]`:
/// - (i, f, o, g) = split(conv([x, h]), num_features)
/// - i, f, o = sigmoid(i), sigmoid(f), sigmoid(o)
/// - g = tanh(g)
/// - c' = f * c + i * g
/// - h' = o * tanh(c')
///
/// Padding is `(filter_size - 1) / 2`, so for odd filter sizes the hidden
/// state keeps the spatial size of the input.
#[derive(Module, Debug)]
pub struct ConvLSTMCell<B: Backend> {
    input_channels: usize,
    filter_size: usize,
    num_features: usize,
    conv: Conv2d<B>, // (input_channels + num_features) -> 4 * num_features
}

impl<B: Backend> ConvLSTMCell<B> {
    /// Create a new ConvLSTM cell with a biased gate convolution
    ///
    /// # Arguments
    /// * `input_channels` - Channels of the input feature map
    /// * `filter_size` - Height and width of the convolution filters (odd)
    /// * `num_features` - Channels of the hidden and cell states
    /// * `device` - Device to create the module on
    ///
    /// # Panics
    /// If `filter_size` is not odd.
    pub fn new(
        input_channels: usize,
        filter_size: usize,
        num_features: usize,
        device: &B::Device,
    ) -> Self {
        Self::with_conv_bias(input_channels, filter_size, num_features, true, device)
    }

    /// Create a new ConvLSTM cell, choosing whether the gate convolution has a bias
    ///
    /// # Panics
    /// If `filter_size` is not odd.
    pub fn with_conv_bias(
        input_channels: usize,
        filter_size: usize,
        num_features: usize,
        bias: bool,
        device: &B::Device,
    ) -> Self {
        assert!(
            filter_size % 2 == 1,
            "filter_size must be odd to preserve spatial size, got {}",
            filter_size
        );
        let padding = (filter_size - 1) / 2;
        let conv = Conv2dConfig::new(
            [input_channels + num_features, 4 * num_features],
            [filter_size, filter_size],
        )
        .with_stride([1, 1])
        .with_padding(PaddingConfig2d::Explicit(padding, padding))
        .with_bias(bias)
        .init(device);

        Self {
            input_channels,
            filter_size,
            num_features,
            conv,
        }
    }

    pub fn input_channels(&self) -> usize {
        self.input_channels
    }

    pub fn filter_size(&self) -> usize {
        self.filter_size
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Spatial padding applied on each side of the gate convolution
    pub fn padding(&self) -> usize {
        (self.filter_size - 1) / 2
    }

    /// The gate convolution
    pub fn conv(&self) -> &Conv2d<B> {
        &self.conv
    }

    /// Reinitialize the gate convolution with the given weight-init policy
    pub fn apply_weight_init(mut self, init: &WeightInit) -> Self {
        self.conv = self.conv.reinitialize(init);
        self
    }

    /// Zero state matching the batch and spatial size of `input`
    ///
    /// # Arguments
    /// * `input` - Reference tensor of shape `[batch, channels, height, width]`
    pub fn init_hidden(&self, input: &Tensor<B, 4>) -> ConvLstmState<B> {
        let [batch_size, _, height, width] = input.dims();
        ConvLstmState::zeros(
            [batch_size, self.num_features, height, width],
            &input.device(),
        )
    }

    /// Perform one time step
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape `[batch, input_channels, height, width]`
    /// * `state` - Hidden and cell state, each `[batch, num_features, height, width]`
    ///
    /// # Returns
    /// The next (hidden, cell) state
    pub fn forward(&self, input: Tensor<B, 4>, state: ConvLstmState<B>) -> ConvLstmState<B> {
        let ConvLstmState { hidden, cell } = state;
        let n = self.num_features;

        let combined = Tensor::cat(vec![input, hidden], 1);
        let gates = self.conv.forward(combined);

        let input_gate = activation::sigmoid(gates.clone().narrow(1, 0, n));
        let forget_gate = activation::sigmoid(gates.clone().narrow(1, n, n));
        let output_gate = activation::sigmoid(gates.clone().narrow(1, 2 * n, n));
        let candidate = gates.narrow(1, 3 * n, n).tanh();

        let next_cell = forget_gate * cell + input_gate * candidate;
        let next_hidden = output_gate * next_cell.clone().tanh();

        ConvLstmState::new(next_hidden, next_cell)
    }

    /// Same as [`forward`](Self::forward), but validates shapes first
    pub fn try_forward(
        &self,
        input: Tensor<B, 4>,
        state: ConvLstmState<B>,
    ) -> error::Result<ConvLstmState<B>> {
        self.check_step(&input.dims(), &state)?;
        Ok(self.forward(input, state))
    }

    fn check_step(&self, input_dims: &[usize; 4], state: &ConvLstmState<B>) -> error::Result<()> {
        let [batch_size, channels, height, width] = *input_dims;
        if channels != self.input_channels {
            return Err(ConvLstmError::ShapeMismatch {
                context: "cell input",
                expected: vec![batch_size, self.input_channels, height, width],
                actual: input_dims.to_vec(),
            });
        }

        let expected = [batch_size, self.num_features, height, width];
        for (context, dims) in [
            ("hidden state", state.hidden.dims()),
            ("cell state", state.cell.dims()),
        ] {
            if dims != expected {
                return Err(ConvLstmError::ShapeMismatch {
                    context,
                    expected: expected.to_vec(),
                    actual: dims.to_vec(),
                });
            }
        }
        Ok(())
    }
}
