//! # ConvLSTM (Rust)
//!
//! Convolutional LSTM layers for spatiotemporal sequences, built on the Burn
//! framework.
//!
//! ## Features
//!
//! - **ConvLSTMCell**: LSTM gates computed by one 2-D convolution per step
//! - **ConvLSTM**: Stacked layers over whole sequences with carried state
//! - **Weight init**: Explicit per-layer-kind reinitialization
//! - **Training**: SGD with weight/bias parameter groups and global-norm clipping
//! - **Checkpoints**: Burn binary records
//!
//! ## Quick Start
//!
//! ```rust
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//! use convlstm::prelude::*;
//!
//! type Backend = NdArray<f32>;
//! let device = Default::default();
//!
//! let model = ConvLstmConfig::new(3, 4, 3, 2)
//!     .with_weight_init(Some(WeightInit::new()))
//!     .init::<Backend>(&device);
//!
//! // [batch, seq_len, channels, height, width]
//! let input = Tensor::<Backend, 5>::zeros([2, 5, 3, 8, 8], &device);
//! let (states, output) = model.forward(input, None);
//!
//! assert_eq!(output.dims(), [5, 2, 4, 8, 8]);
//! assert_eq!(states.len(), 2);
//! ```

pub mod cells;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod init;
pub mod rnn;
pub mod training;

pub mod prelude {
    pub use crate::cells::{ConvLSTMCell, ConvLstmState};
    pub use crate::config::ConvLstmConfig;
    pub use crate::error::ConvLstmError;
    pub use crate::init::{LayerKind, Reinitialize, WeightInit};
    pub use crate::rnn::ConvLSTM;
    pub use crate::training::{fit, ParamGroup, TrainingConfig, TrainingSummary};
}
