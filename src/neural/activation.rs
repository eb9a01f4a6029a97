//! Activation functions applied elementwise after a layer's weighted sum.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Activation shared between layers and network copies.
///
/// Activations are never mutated after construction, so every layer built
/// from the same source holds the same instance.
pub type SharedActivation = Arc<Activation>;

/// Scalar transform with a forward and a derivative form.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Activation {
    /// `max(0, x)`
    Rectified,
    /// `1 / (1 + e^(-x * coefficient))`
    Sigmoid {
        #[serde(default = "default_coefficient")]
        coefficient: f64,
    },
    /// Hyperbolic tangent
    Tanh,
}

fn default_coefficient() -> f64 {
    Activation::DEFAULT_SIGMOID_COEFFICIENT
}

impl Default for Activation {
    fn default() -> Self {
        Self::sigmoid(Self::DEFAULT_SIGMOID_COEFFICIENT)
    }
}

impl Activation {
    /// Steepness used when a sigmoid is built without one
    pub const DEFAULT_SIGMOID_COEFFICIENT: f64 = 0.5;

    pub fn sigmoid(coefficient: f64) -> Self {
        Self::Sigmoid { coefficient }
    }

    /// Wrap into the shared form layers hold.
    pub fn shared(self) -> SharedActivation {
        Arc::new(self)
    }

    #[inline]
    pub fn forward(&self, x: f64) -> f64 {
        match *self {
            Self::Rectified => x.max(0.0),
            Self::Sigmoid { coefficient } => 1.0 / (1.0 + (-x * coefficient).exp()),
            Self::Tanh => x.tanh(),
        }
    }

    /// Derivative form.
    ///
    /// Sigmoid and tanh expect the already activated value `y`, not the raw
    /// sum. The rectified derivative equals its forward function.
    #[inline]
    pub fn derivative(&self, y: f64) -> f64 {
        match *self {
            Self::Rectified => y.max(0.0),
            Self::Sigmoid { .. } => y * (1.0 - y),
            Self::Tanh => 1.0 - y * y,
        }
    }
}
