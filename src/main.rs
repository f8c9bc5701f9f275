use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use neurolander::config::AppConfig;
use neurolander::engines::evaluation::{replay_champion, NetworkBuilder, PopulationEvaluator};
use neurolander::engines::generation::{
    ConsoleProgressCallback, EvolutionEngine, FeedForwardNetwork, HallOfFame, StatisticsReporter,
};
use neurolander::env::{LunarLander, LunarLanderFactory};
use neurolander::io::{load_champion, save_champion, ChampionRecord};
use neurolander::types::RenderMode;
use neurolander::visualize::TopologyGraph;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "neurolander")]
#[command(about = "Evolve neural-network controllers for a lunar landing task")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evolve a controller, save the champion and replay it
    Train {
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,
        /// Overrides `neat.generations`
        #[arg(long)]
        generations: Option<usize>,
        #[arg(long, default_value = "champion.json")]
        champion: PathBuf,
        /// Write per-generation fitness statistics as JSON
        #[arg(long)]
        stats: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        no_replay: bool,
        /// Overrides `evaluation.demo_trials`
        #[arg(long)]
        demo_trials: Option<usize>,
    },
    /// Replay a saved champion with live rendering
    Replay {
        #[arg(long, default_value = "champion.json")]
        champion: PathBuf,
        #[arg(long)]
        trials: Option<usize>,
    },
    /// Draw a saved champion's network topology
    Render {
        #[arg(long, default_value = "champion.json")]
        champion: PathBuf,
        #[arg(long, default_value = "neural_network.png")]
        output: PathBuf,
        #[arg(long, default_value_t = 1200)]
        width: u32,
        #[arg(long, default_value_t = 900)]
        height: u32,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Train {
            config,
            generations,
            champion,
            stats,
            no_replay,
            demo_trials,
        } => {
            let record = train(&config, generations, &champion, stats.as_deref())?;
            if !no_replay {
                let trials = demo_trials.unwrap_or(record.config.evaluation.demo_trials);
                replay(&record, trials)?;
            }
        }
        Commands::Replay { champion, trials } => {
            let record = load_champion(&champion)
                .with_context(|| format!("failed to load champion from {}", champion.display()))?;
            let trials = trials.unwrap_or(record.config.evaluation.demo_trials);
            replay(&record, trials)?;
        }
        Commands::Render {
            champion,
            output,
            width,
            height,
        } => {
            let record = load_champion(&champion)
                .with_context(|| format!("failed to load champion from {}", champion.display()))?;
            TopologyGraph::from_genome(&record.genome, &record.config.genome)
                .render_png(&output, (width, height))
                .with_context(|| format!("failed to render {}", output.display()))?;
            println!("Saved network topology to {}", output.display());
        }
    }

    Ok(())
}

fn train(
    config_path: &Path,
    generations: Option<usize>,
    champion_path: &Path,
    stats_path: Option<&Path>,
) -> Result<ChampionRecord> {
    let config = AppConfig::load_from_file(config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let generations = generations.unwrap_or(config.neat.generations);

    log::info!(
        "Training {} genomes for up to {} generations",
        config.neat.population_size,
        generations
    );

    let evaluator = PopulationEvaluator::new(
        LunarLanderFactory::new(RenderMode::None, config.neat.seed),
        NetworkBuilder,
    );
    let mut engine = EvolutionEngine::new(config.clone())?;
    let mut statistics = StatisticsReporter::new();
    let mut hall_of_fame = HallOfFame::new(5);

    let winner = engine.run(
        evaluator,
        generations,
        (ConsoleProgressCallback::new(), (&mut statistics, &mut hall_of_fame)),
    )?;

    println!("\nBest Genome:\n{}", winner);
    for (rank, genome) in hall_of_fame.get_all().iter().enumerate() {
        log::info!("Hall of fame #{}: genome {} ({:?})", rank + 1, genome.key, genome.fitness);
    }

    if let Some(path) = stats_path {
        statistics
            .save_json(path)
            .with_context(|| format!("failed to write statistics to {}", path.display()))?;
    }

    let record = ChampionRecord::new(winner, config);
    save_champion(champion_path, &record)
        .with_context(|| format!("failed to save champion to {}", champion_path.display()))?;

    Ok(record)
}

fn replay(record: &ChampionRecord, trials: usize) -> Result<()> {
    let mut network = FeedForwardNetwork::create(&record.genome, &record.config.genome)?;
    let env = LunarLander::new(None, RenderMode::Human);
    replay_champion(
        env,
        &mut network,
        trials,
        record.config.evaluation.normalization_epsilon,
    )?;
    Ok(())
}
