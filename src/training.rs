//! Training routine for [`ConvLSTM`]
//!
//! Parameters are split into two groups with their own SGD policy:
//!
//! | Group | Learning rate | Weight decay |
//! |-------|---------------|--------------|
//! | [`ParamGroup::Weight`] | `learning_rate` | `weight_decay` |
//! | [`ParamGroup::Bias`] | `learning_rate × bias_lr_multiplier` | none |
//!
//! Gradients are clipped by their global L2 norm before each update.
//!
//! ```ignore
//! use burn::backend::{Autodiff, NdArray};
//! use convlstm::prelude::*;
//!
//! type Backend = Autodiff<NdArray<f32>>;
//!
//! let model = ConvLSTM::<Backend>::new(3, 3, 5, 1, &device);
//! let config = TrainingConfig::new().with_epochs(10);
//! let (model, summary) = fit(model, input, target, &config)?;
//! println!("final loss: {:?}", summary.final_loss());
//! ```

use burn::config::Config;
use burn::module::ParamId;
use burn::nn::loss::{MseLoss, Reduction};
use burn::optim::decay::WeightDecayConfig;
use burn::optim::momentum::MomentumConfig;
use burn::optim::{GradientsParams, Optimizer, SgdConfig};
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::{ElementConversion, Tensor};

use crate::cells::ConvLstmState;
use crate::error::{self, ConvLstmError};
use crate::rnn::ConvLSTM;

/// Optimization hyper-parameters
#[derive(Config, Debug)]
pub struct TrainingConfig {
    #[config(default = "0.1")]
    pub learning_rate: f64,
    /// L2 penalty for the weight group
    #[config(default = "5e-5")]
    pub weight_decay: f32,
    #[config(default = "2.0")]
    pub bias_lr_multiplier: f64,
    #[config(default = "0.9")]
    pub momentum: f64,
    /// Maximum global L2 norm of all gradients
    #[config(default = "40.0")]
    pub clip_norm: f64,
    #[config(default = "100")]
    pub epochs: usize,
    /// Carry the detached state from one time step to the next within an epoch
    #[config(default = "false")]
    pub carry_state: bool,
}

impl TrainingConfig {
    fn sgd(&self, group: ParamGroup) -> SgdConfig {
        let momentum = MomentumConfig::new()
            .with_momentum(self.momentum)
            .with_dampening(0.0);
        SgdConfig::new()
            .with_momentum(Some(momentum))
            .with_weight_decay(group.weight_decay(self).map(WeightDecayConfig::new))
    }
}

/// Parameter groups of a ConvLSTM.
///
/// Weights are the 4-D gate convolution kernels, biases their 1-D offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamGroup {
    Weight,
    Bias,
}

impl ParamGroup {
    pub fn learning_rate(&self, config: &TrainingConfig) -> f64 {
        match self {
            ParamGroup::Weight => config.learning_rate,
            ParamGroup::Bias => config.learning_rate * config.bias_lr_multiplier,
        }
    }

    pub fn weight_decay(&self, config: &TrainingConfig) -> Option<f32> {
        match self {
            ParamGroup::Weight => Some(config.weight_decay),
            ParamGroup::Bias => None,
        }
    }
}

/// Classify every trainable parameter of `model`, in layer order
pub fn param_groups<B: Backend>(model: &ConvLSTM<B>) -> Vec<(ParamId, ParamGroup)> {
    let mut groups = Vec::with_capacity(2 * model.num_layers());
    for cell in model.cells() {
        let conv = cell.conv();
        groups.push((conv.weight.id, ParamGroup::Weight));
        if let Some(bias) = &conv.bias {
            groups.push((bias.id, ParamGroup::Bias));
        }
    }
    groups
}

fn squared_norm<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> f64 {
    tensor.powf_scalar(2.0).sum().into_scalar().elem::<f64>()
}

fn scale_grad<B: Backend, const D: usize>(grads: &mut GradientsParams, id: ParamId, scale: f64) {
    if let Some(grad) = grads.remove::<B, D>(id) {
        grads.register(id, grad.mul_scalar(scale));
    }
}

fn move_grad<B: Backend, const D: usize>(
    from: &mut GradientsParams,
    to: &mut GradientsParams,
    id: ParamId,
) {
    if let Some(grad) = from.remove::<B, D>(id) {
        to.register(id, grad);
    }
}

/// Clip gradients by their global L2 norm
///
/// When the norm over all listed parameters exceeds `max_norm`, every
/// gradient is scaled by `max_norm / norm`.
///
/// # Returns
/// The norm before clipping
pub fn clip_global_norm<B: Backend>(
    grads: &mut GradientsParams,
    params: &[(ParamId, ParamGroup)],
    max_norm: f64,
) -> f64 {
    let total_norm = params
        .iter()
        .map(|&(id, group)| match group {
            ParamGroup::Weight => grads.get::<B, 4>(id).map_or(0.0, squared_norm),
            ParamGroup::Bias => grads.get::<B, 1>(id).map_or(0.0, squared_norm),
        })
        .sum::<f64>()
        .sqrt();

    if total_norm > max_norm {
        let scale = max_norm / total_norm;
        tracing::warn!(total_norm, coef = scale, "clipping gradient");
        for &(id, group) in params {
            match group {
                ParamGroup::Weight => scale_grad::<B, 4>(grads, id, scale),
                ParamGroup::Bias => scale_grad::<B, 1>(grads, id, scale),
            }
        }
    }

    total_norm
}

/// Split gradients into (weight, bias) groups
fn split_groups<B: Backend>(
    mut grads: GradientsParams,
    params: &[(ParamId, ParamGroup)],
) -> (GradientsParams, GradientsParams) {
    let mut weights = GradientsParams::new();
    let mut biases = GradientsParams::new();
    for &(id, group) in params {
        match group {
            ParamGroup::Weight => move_grad::<B, 4>(&mut grads, &mut weights, id),
            ParamGroup::Bias => move_grad::<B, 1>(&mut grads, &mut biases, id),
        }
    }
    (weights, biases)
}

/// Outcome of [`fit`]
#[derive(Debug, Clone, Default)]
pub struct TrainingSummary {
    /// Loss of every optimization step, in order
    pub losses: Vec<f32>,
    /// Mean loss of every epoch
    pub epoch_losses: Vec<f32>,
    /// Number of steps whose gradients were clipped
    pub clipped_steps: usize,
}

impl TrainingSummary {
    pub fn final_loss(&self) -> Option<f32> {
        self.losses.last().copied()
    }
}

/// Train `model` to predict `target[:, t]` from `input[:, t]`
///
/// Every time step is fed as a length-one sequence and the prediction is the
/// last layer's hidden map, compared to the target with mean squared error.
///
/// # Arguments
/// * `input` - `[batch, seq, input_channels, height, width]`
/// * `target` - `[batch, seq, num_features, height, width]`
pub fn fit<B: AutodiffBackend>(
    mut model: ConvLSTM<B>,
    input: Tensor<B, 5>,
    target: Tensor<B, 5>,
    config: &TrainingConfig,
) -> error::Result<(ConvLSTM<B>, TrainingSummary)> {
    let [batch_size, seq_len, channels, height, width] = input.dims();
    if seq_len == 0 {
        return Err(ConvLstmError::EmptySequence);
    }
    if channels != model.input_channels() {
        return Err(ConvLstmError::ShapeMismatch {
            context: "training input",
            expected: vec![batch_size, seq_len, model.input_channels(), height, width],
            actual: input.dims().to_vec(),
        });
    }
    let expected_target = [batch_size, seq_len, model.num_features(), height, width];
    if target.dims() != expected_target {
        return Err(ConvLstmError::ShapeMismatch {
            context: "training target",
            expected: expected_target.to_vec(),
            actual: target.dims().to_vec(),
        });
    }

    let params = param_groups(&model);
    let weight_lr = ParamGroup::Weight.learning_rate(config);
    let bias_lr = ParamGroup::Bias.learning_rate(config);
    let mut weight_optim = config.sgd(ParamGroup::Weight).init::<B, ConvLSTM<B>>();
    let mut bias_optim = config.sgd(ParamGroup::Bias).init::<B, ConvLSTM<B>>();
    let loss_fn = MseLoss::new();

    let mut summary = TrainingSummary::default();

    for epoch in 0..config.epochs {
        let mut carried: Option<Vec<ConvLstmState<B>>> = None;
        let mut epoch_loss = 0.0f32;

        for t in 0..seq_len {
            let step_input = input.clone().narrow(1, t, 1);
            let step_target = target.clone().narrow(1, t, 1).squeeze::<4>(1);

            let (states, output) = model.forward(step_input, carried.take());
            let prediction = output.squeeze::<4>(0);
            let loss = loss_fn.forward(prediction, step_target, Reduction::Mean);
            let loss_value = loss.clone().into_scalar().elem::<f32>();

            if config.carry_state {
                carried = Some(states.into_iter().map(ConvLstmState::detach).collect());
            }

            let mut grads = GradientsParams::from_grads(loss.backward(), &model);
            let norm = clip_global_norm::<B::InnerBackend>(&mut grads, &params, config.clip_norm);
            if norm > config.clip_norm {
                summary.clipped_steps += 1;
            }

            let (weight_grads, bias_grads) = split_groups::<B::InnerBackend>(grads, &params);
            model = weight_optim.step(weight_lr, model, weight_grads);
            model = bias_optim.step(bias_lr, model, bias_grads);

            tracing::info!(epoch, step = t, loss = loss_value, grad_norm = norm, "training step");
            summary.losses.push(loss_value);
            epoch_loss += loss_value;
        }

        let mean_loss = epoch_loss / seq_len as f32;
        tracing::info!(epoch, loss = mean_loss, "epoch finished");
        summary.epoch_losses.push(mean_loss);
    }

    Ok((model, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::tensor::Distribution;

    type InnerBackend = NdArray<f32>;
    type TrainBackend = Autodiff<InnerBackend>;

    #[test]
    fn test_group_policies() {
        let config = TrainingConfig::new();

        assert_eq!(ParamGroup::Weight.learning_rate(&config), 0.1);
        assert_eq!(ParamGroup::Bias.learning_rate(&config), 0.2);
        assert_eq!(ParamGroup::Weight.weight_decay(&config), Some(5e-5));
        assert_eq!(ParamGroup::Bias.weight_decay(&config), None);
    }

    #[test]
    fn test_param_groups() {
        let device = Default::default();
        let model = ConvLSTM::<InnerBackend>::new(3, 4, 3, 2, &device);

        let groups: Vec<ParamGroup> = param_groups(&model).into_iter().map(|(_, g)| g).collect();
        assert_eq!(
            groups,
            vec![
                ParamGroup::Weight,
                ParamGroup::Bias,
                ParamGroup::Weight,
                ParamGroup::Bias
            ]
        );

        let ids = param_groups(&model);
        assert_eq!(ids[0].0, model.cells()[0].conv().weight.id);
    }

    #[test]
    fn test_param_groups_without_bias() {
        let device = Default::default();
        let model = crate::config::ConvLstmConfig::new(3, 4, 3, 2)
            .with_bias(false)
            .init::<InnerBackend>(&device);

        let groups = param_groups(&model);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|(_, g)| *g == ParamGroup::Weight));
    }

    #[test]
    fn test_clip_global_norm() {
        let device = Default::default();
        let weight_id = ParamId::new();
        let bias_id = ParamId::new();
        let params = [(weight_id, ParamGroup::Weight), (bias_id, ParamGroup::Bias)];

        // sqrt(9 * 1^2 + 4^2) = 5
        let mut grads = GradientsParams::new();
        grads.register(weight_id, Tensor::<InnerBackend, 4>::ones([1, 1, 3, 3], &device));
        grads.register(bias_id, Tensor::<InnerBackend, 1>::from_floats([4.0], &device));

        let norm = clip_global_norm::<InnerBackend>(&mut grads, &params, 1.0);
        assert!((norm - 5.0).abs() < 1e-6);

        let weight = grads.get::<InnerBackend, 4>(weight_id).unwrap();
        let bias = grads.get::<InnerBackend, 1>(bias_id).unwrap();
        assert!((weight.max().into_scalar() - 0.2).abs() < 1e-6);
        assert!((bias.into_scalar() - 0.8).abs() < 1e-6);

        let clipped = clip_global_norm::<InnerBackend>(&mut grads, &params, 1.0);
        assert!((clipped - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_clip_global_norm_below_threshold() {
        let device = Default::default();
        let weight_id = ParamId::new();
        let params = [(weight_id, ParamGroup::Weight)];

        let mut grads = GradientsParams::new();
        grads.register(weight_id, Tensor::<InnerBackend, 4>::full([1, 1, 2, 2], 0.5, &device));

        let norm = clip_global_norm::<InnerBackend>(&mut grads, &params, 40.0);
        assert!((norm - 1.0).abs() < 1e-6);
        let weight = grads.get::<InnerBackend, 4>(weight_id).unwrap();
        assert!((weight.min().into_scalar() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_fit_reduces_loss() {
        let device = Default::default();
        let model = ConvLSTM::<TrainBackend>::new(1, 2, 3, 1, &device);

        let input = Tensor::<TrainBackend, 5>::random(
            [2, 3, 1, 4, 4],
            Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        let target = Tensor::<TrainBackend, 5>::full([2, 3, 2, 4, 4], 0.25, &device);
        let config = TrainingConfig::new().with_learning_rate(0.05).with_epochs(25);

        let (_, summary) = fit(model, input, target, &config).unwrap();

        assert_eq!(summary.losses.len(), 25 * 3);
        assert_eq!(summary.epoch_losses.len(), 25);
        let first = summary.epoch_losses[0];
        let last = *summary.epoch_losses.last().unwrap();
        assert!(last < first, "loss did not decrease: {} -> {}", first, last);
    }

    #[test]
    fn test_fit_counts_clipped_steps() {
        let device = Default::default();
        let model = ConvLSTM::<TrainBackend>::new(1, 2, 3, 1, &device);

        let input = Tensor::<TrainBackend, 5>::random(
            [1, 3, 1, 4, 4],
            Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        let target = Tensor::<TrainBackend, 5>::full([1, 3, 2, 4, 4], 0.5, &device);
        let config = TrainingConfig::new()
            .with_epochs(2)
            .with_clip_norm(1e-9);

        let (_, summary) = fit(model, input, target, &config).unwrap();

        assert_eq!(summary.losses.len(), 6);
        assert_eq!(summary.clipped_steps, summary.losses.len());
    }

    #[test]
    fn test_fit_without_clipping() {
        let device = Default::default();
        let model = ConvLSTM::<TrainBackend>::new(1, 1, 3, 1, &device);

        let input = Tensor::<TrainBackend, 5>::zeros([1, 2, 1, 3, 3], &device);
        let target = Tensor::<TrainBackend, 5>::zeros([1, 2, 1, 3, 3], &device);
        let config = TrainingConfig::new()
            .with_epochs(1)
            .with_clip_norm(f64::MAX);

        let (_, summary) = fit(model, input, target, &config).unwrap();
        assert_eq!(summary.clipped_steps, 0);
    }

    #[test]
    fn test_training_config_json_round_trip() {
        let config = TrainingConfig::new().with_epochs(7).with_carry_state(true);
        let restored = TrainingConfig::load_binary(config.to_string().as_bytes()).unwrap();

        assert_eq!(restored.epochs, 7);
        assert!(restored.carry_state);
        assert_eq!(restored.clip_norm, 40.0);
    }

    #[test]
    fn test_fit_with_carried_state() {
        let device = Default::default();
        let model = ConvLSTM::<TrainBackend>::new(1, 1, 3, 2, &device);

        let input = Tensor::<TrainBackend, 5>::zeros([1, 4, 1, 3, 3], &device);
        let target = Tensor::<TrainBackend, 5>::zeros([1, 4, 1, 3, 3], &device);
        let config = TrainingConfig::new().with_epochs(2).with_carry_state(true);

        let (model, summary) = fit(model, input, target, &config).unwrap();
        assert_eq!(summary.losses.len(), 8);
        assert_eq!(model.num_layers(), 2);
    }

    #[test]
    fn test_fit_rejects_target_shape() {
        let device = Default::default();
        let model = ConvLSTM::<TrainBackend>::new(1, 2, 3, 1, &device);

        let input = Tensor::<TrainBackend, 5>::zeros([1, 2, 1, 4, 4], &device);
        let target = Tensor::<TrainBackend, 5>::zeros([1, 2, 1, 4, 4], &device);

        let result = fit(model, input, target, &TrainingConfig::new().with_epochs(1));
        assert!(matches!(
            result,
            Err(ConvLstmError::ShapeMismatch {
                context: "training target",
                ..
            })
        ));
    }
}
