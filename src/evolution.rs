//! Evolution mechanics: selection, crossover, mutation and reinsertion.

use crate::config::{Config, EvolutionConfig};
use crate::error::{NetworkError, Result};
use crate::fitness::{Evaluated, FitnessReport};
use crate::neural::{uniform_swap, MutationConfig, NeuralNet, SharedActivation};
use crate::stats::GenerationStats;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

/// Genetic operators applied during a generation transition
#[derive(Clone, Debug, PartialEq)]
pub struct EvolutionEngine {
    pub mutation_config: MutationConfig,
    /// Per-position probability that children inherit without swapping
    pub crossover_chance: f32,
    /// Probability that a parent pair produces offspring
    pub crossover_probability: f32,
}

impl Default for EvolutionEngine {
    fn default() -> Self {
        Self::from_evolution_config(&EvolutionConfig::default())
    }
}

impl EvolutionEngine {
    /// Create evolution engine from config
    pub fn from_config(config: &Config) -> Self {
        Self::from_evolution_config(&config.evolution)
    }

    pub fn from_evolution_config(config: &EvolutionConfig) -> Self {
        Self {
            mutation_config: config.mutation(),
            crossover_chance: config.crossover_chance,
            crossover_probability: config.crossover_probability,
        }
    }

    /// Rank networks by descending fitness and keep the top `count`.
    ///
    /// The order fixes crossover pairing: `parents[2i]` mates with
    /// `parents[2i + 1]`. Ties keep population order.
    pub fn select_parents<'a>(&self, networks: &'a [NeuralNet], count: usize) -> Vec<&'a NeuralNet> {
        let mut ranked: Vec<&NeuralNet> = networks.iter().collect();
        ranked.sort_by(|a, b| b.cmp_fitness(a));
        ranked.truncate(count);
        ranked
    }

    /// Cross adjacent parent pairs.
    ///
    /// Each pair yields two children with probability `crossover_probability`
    /// and nothing otherwise. An unpaired trailing parent is skipped.
    pub fn cross<R: Rng + ?Sized>(&self, parents: &[&NeuralNet], rng: &mut R) -> Result<Vec<NeuralNet>> {
        let mut offspring = Vec::with_capacity(parents.len());

        for pair in parents.chunks_exact(2) {
            if rng.gen::<f32>() < self.crossover_probability {
                let (child1, child2) = uniform_swap(pair[0], pair[1], self.crossover_chance, rng)?;
                offspring.push(child1);
                offspring.push(child2);
            }
        }

        Ok(offspring)
    }

    /// Mutate every offspring in place
    pub fn mutate<R: Rng + ?Sized>(&self, offspring: &mut [NeuralNet], rng: &mut R) {
        for network in offspring {
            network.mutate_with(&self.mutation_config, rng);
        }
    }

    /// Fill the shortfall up to `size` with the fittest of `previous`.
    ///
    /// Backfilled networks are moved over unchanged, fitness included.
    pub fn reinsert(
        &self,
        mut offspring: Vec<NeuralNet>,
        mut previous: Vec<NeuralNet>,
        size: usize,
    ) -> Vec<NeuralNet> {
        let shortfall = size.saturating_sub(offspring.len());
        if shortfall > 0 {
            previous.sort_by(|a, b| b.cmp_fitness(a));
            previous.truncate(shortfall);
            offspring.extend(previous);
        }
        offspring
    }
}

type GenerationListener = Box<dyn FnMut(&GenerationStats) + Send>;

/// Fixed-size population evolved one generation at a time.
///
/// The environment reads [`networks`](Self::networks), drives them through
/// [`NeuralNet::feed_forward`], reports scores with
/// [`assign_fitness`](Self::assign_fitness) and then calls
/// [`evolve`](Self::evolve).
pub struct Population {
    networks: Vec<NeuralNet>,
    size: usize,
    engine: EvolutionEngine,
    rng: ChaCha8Rng,
    seed: u64,
    generation: u64,
    last_stats: Option<GenerationStats>,
    round_started: Instant,
    listeners: Vec<GenerationListener>,
}

impl Population {
    /// Build a randomized population from config.
    ///
    /// The seed comes from the config or, when absent, from entropy.
    pub fn new(config: &Config) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        Self::new_with_seed(config, seed)
    }

    /// Build a randomized population with a specific seed for reproducibility
    ///
    /// Fails with `EmptyPopulation` when the configured size is below two.
    pub fn new_with_seed(config: &Config, seed: u64) -> Result<Self> {
        let size = config.population.effective_size();
        if size < 2 {
            return Err(NetworkError::EmptyPopulation);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let activation = config.network.activation.shared();

        let mut networks = Vec::with_capacity(size);
        for _ in 0..size {
            let mut net = NeuralNet::new(&config.network.topology)?;
            net.randomize_all(config.network.init_min, config.network.init_max, &mut rng);
            net.set_activation_function(Some(SharedActivation::clone(&activation)))?;
            networks.push(net);
        }

        log::info!(
            "Population created: size={}, topology={:?}, seed={}",
            size,
            config.network.topology,
            seed
        );

        Ok(Self::assemble(networks, EvolutionEngine::from_config(config), rng, seed))
    }

    /// Adopt externally built networks.
    ///
    /// The count must be even and all networks must share one topology.
    /// The population size is the number of networks given.
    pub fn from_networks(networks: Vec<NeuralNet>, engine: EvolutionEngine, seed: u64) -> Result<Self> {
        let first = networks.first().ok_or(NetworkError::EmptyPopulation)?;
        if networks.len() % 2 != 0 {
            return Err(NetworkError::OddPopulation { size: networks.len() });
        }
        for network in &networks[1..] {
            first.ensure_same_topology(network)?;
        }

        let rng = ChaCha8Rng::seed_from_u64(seed);
        Ok(Self::assemble(networks, engine, rng, seed))
    }

    fn assemble(networks: Vec<NeuralNet>, engine: EvolutionEngine, rng: ChaCha8Rng, seed: u64) -> Self {
        Self {
            size: networks.len(),
            networks,
            engine,
            rng,
            seed,
            generation: 0,
            last_stats: None,
            round_started: Instant::now(),
            listeners: Vec::new(),
        }
    }

    /// Current generation, in index order
    pub fn networks(&self) -> &[NeuralNet] {
        &self.networks
    }

    pub fn network(&self, index: usize) -> Option<&NeuralNet> {
        self.networks.get(index)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of completed generation transitions
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn engine(&self) -> &EvolutionEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut EvolutionEngine {
        &mut self.engine
    }

    /// Stats of the most recent transition
    pub fn last_stats(&self) -> Option<&GenerationStats> {
        self.last_stats.as_ref()
    }

    /// Register a callback invoked with the stats of every transition.
    pub fn on_generation<F>(&mut self, listener: F)
    where
        F: FnMut(&GenerationStats) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Apply reported fitness values.
    ///
    /// Fails without touching any network when an index is out of range.
    /// Networks missing from the report keep their current fitness.
    pub fn assign_fitness(&mut self, report: &FitnessReport) -> Result<()> {
        if let Some(max_index) = report.max_index() {
            if max_index >= self.networks.len() {
                return Err(NetworkError::shape(
                    "fitness report indices",
                    self.networks.len(),
                    max_index + 1,
                ));
            }
        }

        for (index, fitness) in report.iter() {
            self.networks[index].set_fitness(fitness);
        }
        Ok(())
    }

    /// Score every network with `evaluate` and assign the result.
    pub fn evaluate<F>(&mut self, mut evaluate: F)
    where
        F: FnMut(usize, &NeuralNet) -> f32,
    {
        for (index, network) in self.networks.iter_mut().enumerate() {
            let fitness = evaluate(index, network);
            network.set_fitness(fitness);
        }
    }

    /// Networks paired with their index and fitness
    pub fn evaluated(&self) -> impl Iterator<Item = Evaluated<'_>> {
        self.networks
            .iter()
            .enumerate()
            .map(|(index, network)| Evaluated::new(index, network))
    }

    /// Fittest network of the current generation
    pub fn best(&self) -> Option<&NeuralNet> {
        self.networks.iter().max_by(|a, b| a.cmp_fitness(b))
    }

    /// Run one generation transition.
    ///
    /// Fitness must already be assigned. Ranks the population, crosses
    /// adjacent parents, mutates the offspring and backfills any shortfall
    /// with the previous generation's best. Returns the stats of the
    /// generation that was just evaluated and passes them to every listener.
    pub fn evolve(&mut self) -> Result<GenerationStats> {
        let duration = self.round_started.elapsed();
        let fitness: Vec<f32> = self.networks.iter().map(NeuralNet::fitness).collect();
        let stats = GenerationStats::compute(
            self.generation + 1,
            &fitness,
            self.last_stats.as_ref(),
            duration,
        );

        let mut offspring = {
            let parents = self.engine.select_parents(&self.networks, self.size);
            self.engine.cross(&parents, &mut self.rng)?
        };
        self.engine.mutate(&mut offspring, &mut self.rng);

        let produced = offspring.len();
        let previous = std::mem::take(&mut self.networks);
        self.networks = self.engine.reinsert(offspring, previous, self.size);

        log::debug!(
            "Generation {}: {} offspring, {} carried over",
            stats.generation,
            produced,
            self.networks.len() - produced
        );
        log::debug!("{}", stats.summary());

        self.generation += 1;
        self.last_stats = Some(stats.clone());
        for listener in &mut self.listeners {
            listener(&stats);
        }
        self.round_started = Instant::now();

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neural::Activation;
    use std::sync::{Arc, Mutex};

    fn test_config(size: usize) -> Config {
        let mut config = Config::default();
        config.population.size = size;
        config
    }

    fn values(net: &NeuralNet) -> Vec<f32> {
        net.layers()
            .iter()
            .flat_map(|l| l.weights().iter().chain(l.biases().iter()).copied())
            .collect()
    }

    #[test]
    fn test_new_population() {
        let population = Population::new_with_seed(&test_config(10), 1).unwrap();
        assert_eq!(population.size(), 10);
        assert_eq!(population.networks().len(), 10);
        assert_eq!(population.generation(), 0);

        for net in population.networks() {
            assert_eq!(net.topology(), &[5, 3, 2]);
            assert!(values(net).iter().all(|v| (-5.0..=5.0).contains(v)));
            assert!(net.layers().iter().all(|l| **l.activation() == Activation::Tanh));
        }
    }

    #[test]
    fn test_odd_size_forced_even() {
        let population = Population::new_with_seed(&test_config(5), 1).unwrap();
        assert_eq!(population.size(), 6);
    }

    #[test]
    fn test_population_too_small() {
        assert_eq!(
            Population::new_with_seed(&test_config(0), 1).err(),
            Some(NetworkError::EmptyPopulation)
        );
        // one is rounded up to a pair
        assert_eq!(Population::new_with_seed(&test_config(1), 1).unwrap().size(), 2);
    }

    #[test]
    fn test_invalid_topology_propagates() {
        let mut config = test_config(4);
        config.network.topology = vec![3];
        assert!(matches!(
            Population::new_with_seed(&config, 1),
            Err(NetworkError::InvalidTopology { stages: 1 })
        ));
    }

    #[test]
    fn test_seeded_populations_match() {
        let a = Population::new_with_seed(&test_config(4), 77).unwrap();
        let b = Population::new_with_seed(&test_config(4), 77).unwrap();
        for (x, y) in a.networks().iter().zip(b.networks()) {
            assert_eq!(values(x), values(y));
        }
    }

    #[test]
    fn test_select_parents_descending() {
        let engine = EvolutionEngine::default();
        let mut networks: Vec<NeuralNet> = (0..4).map(|_| NeuralNet::new(&[2, 1]).unwrap()).collect();
        for (net, f) in networks.iter_mut().zip([1.0, 4.0, 2.0, 3.0]) {
            net.set_fitness(f);
        }

        let parents = engine.select_parents(&networks, 4);
        let order: Vec<f32> = parents.iter().map(|n| n.fitness()).collect();
        assert_eq!(order, vec![4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_cross_gate_closed_yields_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let engine = EvolutionEngine {
            crossover_probability: 0.0,
            ..EvolutionEngine::default()
        };
        let networks: Vec<NeuralNet> = (0..6).map(|_| NeuralNet::new(&[2, 2]).unwrap()).collect();
        let parents: Vec<&NeuralNet> = networks.iter().collect();

        assert!(engine.cross(&parents, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_cross_gate_open_yields_pairs() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let engine = EvolutionEngine {
            crossover_probability: 1.0,
            ..EvolutionEngine::default()
        };
        let networks: Vec<NeuralNet> = (0..5).map(|_| NeuralNet::new(&[2, 2]).unwrap()).collect();
        let parents: Vec<&NeuralNet> = networks.iter().collect();

        // trailing parent has no mate
        assert_eq!(engine.cross(&parents, &mut rng).unwrap().len(), 4);
    }

    #[test]
    fn test_reinsert_fills_with_best() {
        let engine = EvolutionEngine::default();
        let mut previous: Vec<NeuralNet> = (0..4).map(|_| NeuralNet::new(&[2, 1]).unwrap()).collect();
        for (net, f) in previous.iter_mut().zip([1.0, 4.0, 2.0, 3.0]) {
            net.set_fitness(f);
        }
        let offspring = vec![NeuralNet::new(&[2, 1]).unwrap(), NeuralNet::new(&[2, 1]).unwrap()];

        let next = engine.reinsert(offspring, previous, 4);
        let fitness: Vec<f32> = next.iter().map(NeuralNet::fitness).collect();
        assert_eq!(fitness, vec![0.0, 0.0, 4.0, 3.0]);
    }

    #[test]
    fn test_size_preserved_across_generations() {
        for size in [2, 4, 10, 20] {
            let mut config = test_config(size);
            config.evolution.crossover_probability = 0.5;
            let mut population = Population::new_with_seed(&config, size as u64).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(9);

            for _ in 0..15 {
                population.evaluate(|_, _| rng.gen_range(0.0..10.0));
                population.evolve().unwrap();
                assert_eq!(population.networks().len(), size);
            }
            assert_eq!(population.generation(), 15);
        }
    }

    #[test]
    fn test_equal_fitness_preserves_size() {
        let mut config = test_config(8);
        config.evolution.crossover_probability = 0.3;
        let mut population = Population::new_with_seed(&config, 5).unwrap();

        for _ in 0..5 {
            population.evaluate(|_, _| 1.0);
            population.evolve().unwrap();
            assert_eq!(population.networks().len(), 8);
        }
    }

    #[test]
    fn test_no_crossover_keeps_ranked_population() {
        let mut config = test_config(4);
        config.evolution.crossover_probability = 0.0;
        let mut population = Population::new_with_seed(&config, 12).unwrap();
        population
            .assign_fitness(&FitnessReport::from_scores(&[1.0, 4.0, 2.0, 3.0]))
            .unwrap();
        let before: Vec<Vec<f32>> = population.networks().iter().map(values).collect();

        population.evolve().unwrap();

        let after: Vec<Vec<f32>> = population.networks().iter().map(values).collect();
        assert_eq!(after, vec![before[1].clone(), before[3].clone(), before[2].clone(), before[0].clone()]);
    }

    #[test]
    fn test_full_crossover_without_mutation_reproduces_parents() {
        let mut config = test_config(4);
        config.evolution.crossover_probability = 1.0;
        config.evolution.crossover_chance = 1.0;
        config.evolution.mutation_chance = 0.0;
        let mut population = Population::new_with_seed(&config, 13).unwrap();
        population
            .assign_fitness(&FitnessReport::from_scores(&[1.0, 4.0, 2.0, 3.0]))
            .unwrap();
        let before: Vec<Vec<f32>> = population.networks().iter().map(values).collect();

        population.evolve().unwrap();

        let after: Vec<Vec<f32>> = population.networks().iter().map(values).collect();
        assert_eq!(after, vec![before[1].clone(), before[3].clone(), before[2].clone(), before[0].clone()]);
        // all offspring, so fitness starts over
        assert!(population.networks().iter().all(|n| n.fitness() == 0.0));
    }

    #[test]
    fn test_evolve_mutates_offspring() {
        let mut config = test_config(4);
        config.evolution.crossover_probability = 1.0;
        config.evolution.crossover_chance = 1.0;
        config.evolution.mutation_chance = 1.0;
        let strength = config.evolution.mutation_strength;
        let mut population = Population::new_with_seed(&config, 14).unwrap();
        population
            .assign_fitness(&FitnessReport::from_scores(&[1.0, 4.0, 2.0, 3.0]))
            .unwrap();
        let before: Vec<Vec<f32>> = population.networks().iter().map(values).collect();

        population.evolve().unwrap();

        // ranked parents reproduce themselves, then every value is nudged
        for (child, parent) in population.networks().iter().zip([1, 3, 2, 0]) {
            let child = values(child);
            assert_ne!(child, before[parent]);
            for (c, p) in child.iter().zip(&before[parent]) {
                assert!((c - p).abs() <= strength + 1e-5);
            }
        }
    }

    #[test]
    fn test_mutation_spares_backfilled_survivors() {
        let mut rng = ChaCha8Rng::seed_from_u64(15);
        let engine = EvolutionEngine {
            mutation_config: MutationConfig {
                chance: 1.0,
                strength: 0.5,
            },
            crossover_chance: 1.0,
            crossover_probability: 1.0,
        };
        let mut previous: Vec<NeuralNet> = (0..4)
            .map(|_| {
                let mut net = NeuralNet::new(&[3, 2]).unwrap();
                net.randomize_all(-1.0, 1.0, &mut rng);
                net
            })
            .collect();
        for (net, f) in previous.iter_mut().zip([1.0, 4.0, 2.0, 3.0]) {
            net.set_fitness(f);
        }
        let before: Vec<Vec<f32>> = previous.iter().map(values).collect();

        let parents = engine.select_parents(&previous, 4);
        let mut offspring = engine.cross(&parents[..2], &mut rng).unwrap();
        engine.mutate(&mut offspring, &mut rng);
        let next = engine.reinsert(offspring, previous, 4);

        assert_ne!(values(&next[0]), before[1]);
        assert_ne!(values(&next[1]), before[3]);
        assert_eq!(values(&next[2]), before[1]);
        assert_eq!(values(&next[3]), before[3]);
        assert_eq!(next[2].fitness(), 4.0);
    }

    #[test]
    fn test_assign_fitness_out_of_range() {
        let mut population = Population::new_with_seed(&test_config(4), 1).unwrap();
        let mut report = FitnessReport::new();
        report.record(0, 2.0).record(4, 1.0);

        assert_eq!(
            population.assign_fitness(&report),
            Err(NetworkError::shape("fitness report indices", 4, 5))
        );
        assert_eq!(population.networks()[0].fitness(), 0.0);
    }

    #[test]
    fn test_partial_report_keeps_other_fitness() {
        let mut population = Population::new_with_seed(&test_config(4), 1).unwrap();
        population.assign_fitness(&FitnessReport::from_scores(&[1.0, 2.0, 3.0, 4.0])).unwrap();

        let mut report = FitnessReport::new();
        report.record(2, 9.0);
        population.assign_fitness(&report).unwrap();

        let fitness: Vec<f32> = population.evaluated().map(|e| e.fitness).collect();
        assert_eq!(fitness, vec![1.0, 2.0, 9.0, 4.0]);
        assert_eq!(population.best().map(NeuralNet::fitness), Some(9.0));
    }

    #[test]
    fn test_stats_and_listeners() {
        let mut population = Population::new_with_seed(&test_config(4), 2).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        population.on_generation(move |stats| sink.lock().unwrap().push(stats.generation));

        population.assign_fitness(&FitnessReport::from_scores(&[1.0, 4.0, 2.0, 3.0])).unwrap();
        let first = population.evolve().unwrap();
        assert_eq!(first.generation, 1);
        assert_eq!(first.population, 4);
        assert_eq!(first.max_fitness, 4.0);
        assert_eq!(first.median_fitness, 2.5);

        population.evaluate(|i, _| i as f32);
        let second = population.evolve().unwrap();
        assert_eq!(second.generation, 2);
        assert_eq!(second.previous_max_fitness, 4.0);
        assert_eq!(second.previous_median_fitness, 2.5);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(population.last_stats(), Some(&second));
    }

    #[test]
    fn test_from_networks() {
        let networks: Vec<NeuralNet> = (0..4).map(|_| NeuralNet::new(&[3, 2]).unwrap()).collect();
        let population = Population::from_networks(networks, EvolutionEngine::default(), 1).unwrap();
        assert_eq!(population.size(), 4);
        assert_eq!(population.seed(), 1);

        assert_eq!(
            Population::from_networks(Vec::new(), EvolutionEngine::default(), 1).err(),
            Some(NetworkError::EmptyPopulation)
        );

        let three: Vec<NeuralNet> = (0..3).map(|_| NeuralNet::new(&[2, 1]).unwrap()).collect();
        assert_eq!(
            Population::from_networks(three, EvolutionEngine::default(), 1).err(),
            Some(NetworkError::OddPopulation { size: 3 })
        );

        let mixed = vec![NeuralNet::new(&[3, 2]).unwrap(), NeuralNet::new(&[3, 3]).unwrap()];
        assert_eq!(
            Population::from_networks(mixed, EvolutionEngine::default(), 1).err(),
            Some(NetworkError::shape("topology stage size", 2, 3))
        );
    }

    #[test]
    fn test_evolution_keeps_networks_valid() {
        let mut config = test_config(10);
        config.evolution.crossover_probability = 0.8;
        config.evolution.crossover_chance = 0.5;
        config.evolution.mutation_chance = 0.3;
        let mut population = Population::new_with_seed(&config, 21).unwrap();

        for _ in 0..20 {
            population.evaluate(|_, net| net.feed_forward(&[0.2; 5]).map(|o| o[0]).unwrap_or(0.0));
            population.evolve().unwrap();
        }

        assert!(population.networks().iter().all(NeuralNet::is_valid));
    }
}
