//! # ConvLSTM Cell
//!
//! Single-timestep convolutional LSTM cell. The cell is wrapped by
//! [`ConvLSTM`](crate::rnn::ConvLSTM) for layered sequence processing; use it
//! directly when you need custom control over time steps or state.
//!
//! ## Gate Equations
//!
//! ```text
//! A            = conv([x, h])               // 4 × num_features channels
//! (i, f, o, g) = split(A, num_features)
//! c' = σ(f) ⊙ c + σ(i) ⊙ tanh(g)
//! h' = σ(o) ⊙ tanh(c')
//! ```
//!
//! ## Tensor Shapes
//!
//! | Tensor | Shape | Description |
//! |--------|-------|-------------|
//! | `input` | `[batch, input_channels, height, width]` | Input feature map |
//! | `state.hidden` | `[batch, num_features, height, width]` | Previous hidden map |
//! | `state.cell` | `[batch, num_features, height, width]` | Previous cell memory |
//!
//! ## Example
//!
//! ```ignore
//! use convlstm::cells::ConvLSTMCell;
//! use burn::tensor::Tensor;
//!
//! let cell = ConvLSTMCell::<Backend>::new(3, 5, 16, &device);
//!
//! let frame: Tensor<Backend, 4> = /* [batch, 3, 64, 64] */;
//! let state = cell.init_hidden(&frame);
//! let state = cell.forward(frame, state);
//! // state.hidden: [batch, 16, 64, 64]
//! ```

pub mod conv_lstm_cell;

pub use conv_lstm_cell::{ConvLSTMCell, ConvLstmState};
