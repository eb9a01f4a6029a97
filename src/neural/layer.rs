//! A single fully connected layer.

use super::activation::{Activation, SharedActivation};
use crate::error::{NetworkError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;
use std::fmt;

/// Uniform draw in `[min, max]` as `min + u * |max - min|`.
///
/// Inverted bounds shift the interval instead of panicking.
#[inline]
pub(crate) fn random_value<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    let range = (min - max).abs();
    min + rng.gen::<f32>() * range
}

/// Connections from `n` neurons to the `m` neurons of the next stage.
///
/// `weights[[i, j]]` connects input neuron `i` to output neuron `j`. There is
/// one bias per *input* neuron, and the whole bias vector is added into every
/// output sum.
#[derive(Clone, Debug)]
pub struct Layer {
    pub(crate) weights: Array2<f32>,
    pub(crate) biases: Array1<f32>,
    activation: SharedActivation,
}

impl Layer {
    /// Zero-valued layer with the default sigmoid activation.
    pub fn new(neuron_count: usize, output_count: usize) -> Self {
        Self::with_activation(neuron_count, output_count, Activation::default().shared())
    }

    pub fn with_activation(
        neuron_count: usize,
        output_count: usize,
        activation: SharedActivation,
    ) -> Self {
        Self {
            weights: Array2::zeros((neuron_count, output_count)),
            biases: Array1::zeros(neuron_count),
            activation,
        }
    }

    #[inline]
    pub fn neuron_count(&self) -> usize {
        self.weights.nrows()
    }

    #[inline]
    pub fn output_count(&self) -> usize {
        self.weights.ncols()
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    pub fn biases(&self) -> &Array1<f32> {
        &self.biases
    }

    /// Weight from input neuron `i` to output neuron `j`
    pub fn weight(&self, i: usize, j: usize) -> Option<f32> {
        self.weights.get([i, j]).copied()
    }

    pub fn activation(&self) -> &SharedActivation {
        &self.activation
    }

    /// Total number of weights and biases
    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    /// Overwrite all weights from a flat slice, input-neuron-major.
    ///
    /// Values `[0..m)` are the weights from input neuron 0 to every output,
    /// `[m..2m)` those from input neuron 1, and so on.
    pub fn set_weights(&mut self, values: &[f32]) -> Result<()> {
        if values.len() != self.weights.len() {
            return Err(NetworkError::shape("layer weights", self.weights.len(), values.len()));
        }
        for (w, &v) in self.weights.iter_mut().zip(values) {
            *w = v;
        }
        Ok(())
    }

    pub fn set_biases(&mut self, values: &[f32]) -> Result<()> {
        if values.len() != self.biases.len() {
            return Err(NetworkError::shape("layer biases", self.biases.len(), values.len()));
        }
        for (b, &v) in self.biases.iter_mut().zip(values) {
            *b = v;
        }
        Ok(())
    }

    /// Weighted sum plus the summed bias vector, then the activation.
    pub fn calculate(&self, inputs: &[f32]) -> Result<Vec<f32>> {
        if inputs.len() != self.neuron_count() {
            return Err(NetworkError::shape("layer inputs", self.neuron_count(), inputs.len()));
        }

        let bias_sum = self.biases.sum();
        let sums = ArrayView1::from(inputs).dot(&self.weights);

        Ok(sums
            .iter()
            .map(|&s| self.activation.forward(f64::from(s + bias_sum)) as f32)
            .collect())
    }

    /// Perturb each weight and bias with probability `chance` by a uniform
    /// amount in `[-magnitude, magnitude]`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, chance: f32, magnitude: f32, rng: &mut R) {
        if chance <= 0.0 {
            return;
        }

        for w in self.weights.iter_mut().chain(self.biases.iter_mut()) {
            if rng.gen::<f32>() <= chance {
                *w += random_value(rng, -magnitude, magnitude);
            }
        }
    }

    pub fn randomize_weights<R: Rng + ?Sized>(&mut self, min: f32, max: f32, rng: &mut R) {
        self.weights.mapv_inplace(|_| random_value(rng, min, max));
    }

    pub fn randomize_biases<R: Rng + ?Sized>(&mut self, min: f32, max: f32, rng: &mut R) {
        self.biases.mapv_inplace(|_| random_value(rng, min, max));
    }

    pub fn set_activation_function(&mut self, activation: SharedActivation) {
        self.activation = activation;
    }

    /// Independent weight/bias storage, same activation instance.
    pub fn deep_copy(&self) -> Self {
        Self {
            weights: self.weights.to_owned(),
            biases: self.biases.to_owned(),
            activation: SharedActivation::clone(&self.activation),
        }
    }

    /// Same shape and activation, zero-valued storage.
    pub(crate) fn blank_copy(&self) -> Self {
        Self::with_activation(
            self.neuron_count(),
            self.output_count(),
            SharedActivation::clone(&self.activation),
        )
    }

    /// Check that no weight or bias is NaN/Inf
    pub fn is_valid(&self) -> bool {
        self.weights.iter().all(|w| w.is_finite()) && self.biases.iter().all(|b| b.is_finite())
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Weights")?;
        for (i, row) in self.weights.outer_iter().enumerate() {
            for (j, w) in row.iter().enumerate() {
                write!(f, "[{},{}]: {:.2} ", i, j, w)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Biases")?;
        for (i, b) in self.biases.iter().enumerate() {
            write!(f, "[{}]: {:.2} ", i, b)?;
        }
        Ok(())
    }
}
