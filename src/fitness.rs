//! Fitness values handed over by the environment.

use crate::neural::NeuralNet;
use std::collections::BTreeMap;

/// Fitness per population index for one evaluation round
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FitnessReport {
    scores: BTreeMap<usize, f32>,
}

impl FitnessReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report indexed by position in `scores`
    pub fn from_scores(scores: &[f32]) -> Self {
        Self {
            scores: scores.iter().copied().enumerate().collect(),
        }
    }

    /// Record the fitness of the network at `index`, replacing any earlier value.
    pub fn record(&mut self, index: usize, fitness: f32) -> &mut Self {
        self.scores.insert(index, fitness);
        self
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.scores.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Entries in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.scores.iter().map(|(&i, &f)| (i, f))
    }

    /// Highest index mentioned, if any
    pub(crate) fn max_index(&self) -> Option<usize> {
        self.scores.keys().next_back().copied()
    }
}

impl FromIterator<(usize, f32)> for FitnessReport {
    fn from_iter<I: IntoIterator<Item = (usize, f32)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

/// A network paired with its position and the fitness it was assigned
#[derive(Clone, Copy, Debug)]
pub struct Evaluated<'a> {
    pub index: usize,
    pub network: &'a NeuralNet,
    pub fitness: f32,
}

impl<'a> Evaluated<'a> {
    pub fn new(index: usize, network: &'a NeuralNet) -> Self {
        Self {
            index,
            network,
            fitness: network.fitness(),
        }
    }
}
