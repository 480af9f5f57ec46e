//! Parameter snapshots
//!
//! Thin wrappers over Burn's recorders with full precision: named
//! MessagePack for in-memory snapshots, bincode for files. Loading
//! needs a module of the same architecture (typically built from the same
//! [`ConvLstmConfig`](crate::config::ConvLstmConfig)) whose parameters are
//! then replaced by the recorded ones.

use std::path::PathBuf;

use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings, NamedMpkBytesRecorder, Recorder};
use burn::tensor::backend::Backend;

use crate::error;
use crate::rnn::ConvLSTM;

/// Serialize the parameters of `model` into bytes
pub fn to_bytes<B: Backend>(model: &ConvLSTM<B>) -> error::Result<Vec<u8>> {
    let recorder = NamedMpkBytesRecorder::<FullPrecisionSettings>::default();
    Ok(Recorder::<B>::record(
        &recorder,
        model.clone().into_record(),
        (),
    )?)
}

/// Load parameters produced by [`to_bytes`] into `model`
///
/// Malformed bytes are reported as [`ConvLstmError::Record`](crate::error::ConvLstmError::Record).
pub fn from_bytes<B: Backend>(
    model: ConvLSTM<B>,
    bytes: Vec<u8>,
    device: &B::Device,
) -> error::Result<ConvLSTM<B>> {
    let recorder = NamedMpkBytesRecorder::<FullPrecisionSettings>::default();
    let record = Recorder::<B>::load(&recorder, bytes, device)?;
    Ok(model.load_record(record))
}

/// Save the parameters of `model` to `path` (the recorder appends `.bin`)
pub fn save<B: Backend>(model: &ConvLSTM<B>, path: impl Into<PathBuf>) -> error::Result<()> {
    let path = path.into();
    model
        .clone()
        .save_file(path.clone(), &BinFileRecorder::<FullPrecisionSettings>::new())?;
    tracing::debug!(path = %path.display(), "saved ConvLSTM parameters");
    Ok(())
}

/// Load parameters saved with [`save`] into `model`
pub fn load<B: Backend>(
    model: ConvLSTM<B>,
    path: impl Into<PathBuf>,
    device: &B::Device,
) -> error::Result<ConvLSTM<B>> {
    let path = path.into();
    let model = model.load_file(
        path.clone(),
        &BinFileRecorder::<FullPrecisionSettings>::new(),
        device,
    )?;
    tracing::debug!(path = %path.display(), "loaded ConvLSTM parameters");
    Ok(model)
}
