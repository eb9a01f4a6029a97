//! NEUROEVO - CLI Entry Point
//!
//! Evolves networks against a built-in imitation task: every candidate is
//! scored on how closely it reproduces a fixed, randomly drawn reference
//! network of the same topology.

use clap::{Parser, Subcommand};
use neuroevo::{Config, NeuralNet, Population, StatsHistory};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Samples the reference network is probed with
const SAMPLE_COUNT: usize = 32;

#[derive(Parser)]
#[command(name = "neuroevo")]
#[command(version)]
#[command(about = "Feedforward neural networks trained by a genetic algorithm")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a population on the imitation task
    Train {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of generations to run
        #[arg(short, long, default_value = "100")]
        generations: u64,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            config,
            generations,
            seed,
            quiet,
        } => train(config, generations, seed, quiet),

        Commands::Init { output } => generate_config(output),
    }
}

/// Fixed inputs and the reference network's answers to them
struct ImitationTask {
    inputs: Vec<Vec<f32>>,
    targets: Vec<Vec<f32>>,
}

impl ImitationTask {
    fn new(config: &Config, seed: u64) -> Result<Self, Box<dyn std::error::Error>> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut reference = NeuralNet::new(&config.network.topology)?;
        reference.randomize_all(-1.0, 1.0, &mut rng);
        reference.set_activation_function(Some(config.network.activation.shared()))?;

        let n_inputs = reference.n_inputs();
        let mut inputs = Vec::with_capacity(SAMPLE_COUNT);
        let mut targets = Vec::with_capacity(SAMPLE_COUNT);
        for _ in 0..SAMPLE_COUNT {
            let input: Vec<f32> = (0..n_inputs).map(|_| rng.gen_range(-1.0..1.0)).collect();
            targets.push(reference.feed_forward(&input)?);
            inputs.push(input);
        }

        Ok(Self { inputs, targets })
    }

    /// `1 / (1 + mse)`, so a perfect imitation scores 1
    fn fitness(&self, net: &NeuralNet) -> f32 {
        let mut error = 0.0f32;
        let mut count = 0usize;

        for (input, target) in self.inputs.iter().zip(&self.targets) {
            let Ok(output) = net.feed_forward(input) else {
                return 0.0;
            };
            for (o, t) in output.iter().zip(target) {
                error += (o - t) * (o - t);
                count += 1;
            }
        }

        if count == 0 {
            return 0.0;
        }
        1.0 / (1.0 + error / count as f32)
    }
}

fn train(
    config_path: PathBuf,
    generations: u64,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let mut config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };
    if seed.is_some() {
        config.seed = seed;
    }

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.log_level.as_str()),
    )
    .init();

    if config_path.exists() {
        log::info!("Loaded config from {:?}", config_path);
    } else {
        log::info!("Using default configuration");
    }
    config.validate()?;

    let mut population = Population::new(&config)?;
    let task = ImitationTask::new(&config, population.seed())?;

    let history = Arc::new(Mutex::new(StatsHistory::new()));
    let recorder = Arc::clone(&history);
    population.on_generation(move |stats| {
        if let Ok(mut history) = recorder.lock() {
            history.record(stats.clone());
        }
    });

    println!("Starting evolution");
    println!("  Topology: {:?}", config.network.topology);
    println!("  Population: {}", population.size());
    println!("  Seed: {}", population.seed());
    println!("  Generations: {}", generations);
    println!();

    let start = Instant::now();
    let stats_interval = config.logging.stats_interval.max(1);

    for _ in 0..generations {
        population.evaluate(|_, net| task.fitness(net));
        let stats = population.evolve()?;

        if !quiet && stats.generation % stats_interval == 0 {
            println!("{}", stats.summary());
        }
    }

    // Score the final generation so the reported best is current
    population.evaluate(|_, net| task.fitness(net));

    let elapsed = start.elapsed();
    println!();
    println!("=== Evolution Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Generations: {}", population.generation());
    if let Some(best) = population.best() {
        println!("Best fitness: {:.4}", best.fitness());
    }
    if let Ok(history) = history.lock() {
        if let Some(best) = history.best() {
            println!(
                "Best generation: {} (max {:.4})",
                best.generation, best.max_fitness
            );
        }
    }

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Default configuration written to {:?}", output);
    Ok(())
}
