//! # Layered Sequence Processing
//!
//! [`ConvLSTM`] stacks one [`ConvLSTMCell`](crate::cells::ConvLSTMCell) per
//! layer and runs it over a whole sequence. **This is the primary API most
//! users should use.**
//!
//! ## Tensor Shapes
//!
//! | Tensor | Shape |
//! |--------|-------|
//! | Input | `[batch, seq_len, input_channels, height, width]` (batch-first) |
//! | Output | `[seq_len, batch, num_features, height, width]` (time-major) |
//! | State (per layer) | `[batch, num_features, height, width]` × (hidden, cell) |
//!
//! Height and width are preserved at every layer for odd filter sizes.
//!
//! ## Stateful Processing
//!
//! ```ignore
//! let model = ConvLSTM::<Backend>::new(3, 16, 5, 2, &device);
//!
//! let (state, out1) = model.forward(chunk1, None);
//! let (state, out2) = model.forward(chunk2, Some(state));
//! // Same result as running chunk1 and chunk2 concatenated along time
//! ```

pub mod conv_lstm;

pub use conv_lstm::ConvLSTM;
