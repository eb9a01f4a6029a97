//! Error types for network construction, propagation and evolution.

/// Errors raised by layers, networks and the population.
///
/// All of them are integration errors: the caller supplied data of the wrong
/// shape. Nothing is retried internally.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Input, weight or bias length does not match the expected dimension
    #[error("{context}: expected {expected} values, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Fewer than two stages were given, so no layer can be formed
    #[error("topology needs at least 2 stages, got {stages}")]
    InvalidTopology { stages: usize },

    /// An absent activation function was passed for installation
    #[error("activation function must be provided")]
    NullActivation,

    /// A population was built from fewer than two networks
    #[error("population must hold at least two networks")]
    EmptyPopulation,

    /// Networks are mated in pairs, so a population must be even
    #[error("population size must be even, got {size}")]
    OddPopulation { size: usize },
}

impl NetworkError {
    pub(crate) fn shape(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            context,
            expected,
            actual,
        }
    }
}

/// Result type for network operations
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Errors raised while loading or validating a [`Config`](crate::Config).
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
