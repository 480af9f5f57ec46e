//! Weight initialization hook
//!
//! Layers are reinitialized through the [`Reinitialize`] trait, which each
//! supported layer type implements for its [`LayerKind`]:
//!
//! | Kind | Weights | Bias |
//! |------|---------|------|
//! | [`LayerKind::Convolution`] | `N(conv_mean, conv_std)` | unchanged |
//! | [`LayerKind::Normalization`] | `N(norm_mean, norm_std)` | zero |
//!
//! Apply it once after construction, e.g. with
//! [`ConvLSTM::apply_weight_init`](crate::rnn::ConvLSTM::apply_weight_init).

use burn::config::Config;
use burn::module::Param;
use burn::nn::conv::Conv2d;
use burn::nn::BatchNorm;
use burn::tensor::backend::Backend;
use burn::tensor::{Distribution, Tensor};
use serde::{Deserialize, Serialize};

/// Layer families with distinct initialization rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    Convolution,
    Normalization,
}

/// Distribution parameters used by [`Reinitialize`]
#[derive(Config, Debug)]
pub struct WeightInit {
    #[config(default = "0.0")]
    pub conv_mean: f64,
    #[config(default = "0.02")]
    pub conv_std: f64,
    #[config(default = "1.0")]
    pub norm_mean: f64,
    #[config(default = "0.02")]
    pub norm_std: f64,
}

/// A layer that can redraw its parameters from a [`WeightInit`] policy
pub trait Reinitialize: Sized {
    fn kind(&self) -> LayerKind;

    fn reinitialize(self, init: &WeightInit) -> Self;
}

impl<B: Backend> Reinitialize for Conv2d<B> {
    fn kind(&self) -> LayerKind {
        LayerKind::Convolution
    }

    fn reinitialize(mut self, init: &WeightInit) -> Self {
        self.weight = redraw(self.weight, Distribution::Normal(init.conv_mean, init.conv_std));
        tracing::debug!(
            shape = ?self.weight.dims(),
            mean = init.conv_mean,
            std = init.conv_std,
            "reinitialized convolution weights"
        );
        self
    }
}

impl<B: Backend, const D: usize> Reinitialize for BatchNorm<B, D> {
    fn kind(&self) -> LayerKind {
        LayerKind::Normalization
    }

    fn reinitialize(mut self, init: &WeightInit) -> Self {
        self.gamma = redraw(self.gamma, Distribution::Normal(init.norm_mean, init.norm_std));
        let beta = self.beta.val();
        self.beta = Param::from_tensor(Tensor::zeros(beta.shape(), &beta.device()));
        tracing::debug!(
            features = self.gamma.dims()[0],
            "reinitialized normalization scale and shift"
        );
        self
    }
}

fn redraw<B: Backend, const D: usize>(
    param: Param<Tensor<B, D>>,
    distribution: Distribution,
) -> Param<Tensor<B, D>> {
    let current = param.val();
    Param::from_tensor(Tensor::random(current.shape(), distribution, &current.device()))
}
