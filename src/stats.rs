//! Per-generation statistics.

use std::fmt;
use std::time::Duration;

/// Summary emitted at the end of every generation transition
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationStats {
    /// 1-based number of the generation that was just evaluated
    pub generation: u64,
    /// Number of networks evaluated
    pub population: usize,
    pub max_fitness: f32,
    pub median_fitness: f32,
    pub mean_fitness: f32,
    /// Max fitness of the generation before this one
    pub previous_max_fitness: f32,
    /// Median fitness of the generation before this one
    pub previous_median_fitness: f32,
    /// Time from the start of the evaluation round to the transition
    pub duration: Duration,
}

impl GenerationStats {
    /// Build stats from the fitness values of one generation.
    ///
    /// Max is floored at zero, so a generation of only negative scores reports 0.
    pub fn compute(
        generation: u64,
        fitness: &[f32],
        previous: Option<&GenerationStats>,
        duration: Duration,
    ) -> Self {
        let max_fitness = fitness.iter().copied().fold(0.0f32, f32::max);
        let mean_fitness = if fitness.is_empty() {
            0.0
        } else {
            fitness.iter().sum::<f32>() / fitness.len() as f32
        };

        Self {
            generation,
            population: fitness.len(),
            max_fitness,
            median_fitness: median(fitness),
            mean_fitness,
            previous_max_fitness: previous.map_or(0.0, |p| p.max_fitness),
            previous_median_fitness: previous.map_or(0.0, |p| p.median_fitness),
            duration,
        }
    }

    /// Change of max fitness against the previous generation
    pub fn max_improvement(&self) -> f32 {
        self.max_fitness - self.previous_max_fitness
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "Gen:{:5} | Pop:{:4} | Max:{:8.3} ({:+.3}) | Median:{:8.3} | Mean:{:8.3} | {:.2}s",
            self.generation,
            self.population,
            self.max_fitness,
            self.max_improvement(),
            self.median_fitness,
            self.mean_fitness,
            self.duration.as_secs_f64(),
        )
    }
}

impl fmt::Display for GenerationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

fn median(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default)]
pub struct StatsHistory {
    /// All recorded generations, oldest first
    pub snapshots: Vec<GenerationStats>,
}

impl StatsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generation
    pub fn record(&mut self, stats: GenerationStats) {
        self.snapshots.push(stats);
    }

    pub fn last(&self) -> Option<&GenerationStats> {
        self.snapshots.last()
    }

    /// Generation with the highest max fitness
    pub fn best(&self) -> Option<&GenerationStats> {
        self.snapshots
            .iter()
            .max_by(|a, b| a.max_fitness.total_cmp(&b.max_fitness))
    }

    /// Get max fitness over generations
    pub fn max_series(&self) -> Vec<(u64, f32)> {
        self.snapshots
            .iter()
            .map(|s| (s.generation, s.max_fitness))
            .collect()
    }

    /// Get median fitness over generations
    pub fn median_series(&self) -> Vec<(u64, f32)> {
        self.snapshots
            .iter()
            .map(|s| (s.generation, s.median_fitness))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
