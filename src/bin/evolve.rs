//! Evolve Binary
//!
//! Runs the evolutionary search, resumes checkpoints, and playtests
//! individual genome files.

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use evodeck::evolution::EvolutionConfig;
use evodeck::evolution::EvolutionEngine;
use evodeck::evolution::SkillConfig;
use evodeck::fitness::FitnessStyle;
use evodeck::genome::seeds;
use evodeck::genome::Genome;
use evodeck::players::AgentKind;
use evodeck::save::Checkpoint;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

#[derive(Parser)]
#[command(name = "evolve", about = "evolutionary search over card game rule systems")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// run a fresh evolution
    Run(RunArgs),
    /// continue a run from a checkpoint file
    Resume {
        checkpoint: PathBuf,
        #[arg(long, default_value_t = 5)]
        save_top_n: usize,
        #[arg(long, default_value = "out")]
        output_dir: PathBuf,
    },
    /// simulate one genome file and print the outcome distribution
    Playtest {
        genome: PathBuf,
        #[arg(long, default_value_t = 100)]
        games: usize,
        #[arg(long, default_value = "random")]
        agent: String,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 0)]
        workers: usize,
    },
    /// list the built-in seed genomes
    Seeds,
}

#[derive(Parser)]
struct RunArgs {
    #[arg(long, default_value_t = 100)]
    generations: usize,
    #[arg(long, default_value_t = 50)]
    population_size: usize,
    #[arg(long, default_value_t = 0.10)]
    elitism_rate: f64,
    #[arg(long, default_value_t = 0.70)]
    crossover_rate: f64,
    #[arg(long, default_value_t = 3)]
    tournament_size: usize,
    #[arg(long, default_value_t = 100)]
    games_per_eval: usize,
    #[arg(long, default_value = "balanced")]
    style: String,
    #[arg(long, default_value_t = 500)]
    mcts_iterations: usize,
    /// 0 = one worker per core
    #[arg(long, default_value_t = 0)]
    workers: usize,
    /// 0 = derive the seed from the clock
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long)]
    checkpoint: Option<PathBuf>,
    #[arg(long, default_value_t = 10)]
    checkpoint_interval: usize,
    #[arg(long, default_value = "out")]
    output_dir: PathBuf,
    #[arg(long, default_value_t = 5)]
    save_top_n: usize,
    #[arg(long, default_value_t = 5)]
    skill_eval_frequency: usize,
    #[arg(long, default_value_t = 20)]
    skill_eval_games: usize,
    #[arg(long, default_value_t = 0.2)]
    fpa_threshold: f64,
    #[arg(long, default_value_t = 0.3)]
    fpa_weight: f64,
    #[arg(long, default_value_t = 0.55)]
    low_skill_threshold: f64,
    #[arg(long, default_value_t = 0.3)]
    low_skill_weight: f64,
}

impl RunArgs {
    fn config(&self) -> Result<EvolutionConfig> {
        let Some(style) = FitnessStyle::parse(&self.style) else {
            bail!("unknown style {:?}", self.style);
        };
        Ok(EvolutionConfig {
            population_size: self.population_size,
            generations: self.generations,
            elitism_rate: self.elitism_rate,
            crossover_rate: self.crossover_rate,
            tournament_size: self.tournament_size,
            games_per_eval: self.games_per_eval,
            style,
            seed: self.seed,
            workers: self.workers,
            skill: SkillConfig {
                frequency: self.skill_eval_frequency,
                games: self.skill_eval_games,
                mcts_iterations: self.mcts_iterations,
                fpa_threshold: self.fpa_threshold,
                fpa_weight: self.fpa_weight,
                low_skill_threshold: self.low_skill_threshold,
                low_skill_weight: self.low_skill_weight,
                ..SkillConfig::default()
            },
            checkpoint_interval: self.checkpoint_interval,
            checkpoint_path: self.checkpoint.clone(),
            ..EvolutionConfig::default()
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    evodeck::init();
    match Args::parse().command {
        Command::Run(args) => {
            let config = args.config()?;
            let engine = EvolutionEngine::new(config)?;
            drive(engine, args.save_top_n, &args.output_dir)
        }
        Command::Resume {
            checkpoint,
            save_top_n,
            output_dir,
        } => {
            let snapshot = Checkpoint::load(&checkpoint)?;
            let engine = EvolutionEngine::resume(snapshot)?;
            drive(engine, save_top_n, &output_dir)
        }
        Command::Playtest {
            genome,
            games,
            agent,
            seed,
            workers,
        } => playtest(&genome, games, &agent, seed, workers),
        Command::Seeds => {
            for name in seeds::names() {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

/// run the engine to completion with a progress bar and a ctrl-c hook
/// that finishes the current generation before checkpointing out
fn drive(mut engine: EvolutionEngine, save_top_n: usize, output_dir: &PathBuf) -> Result<()> {
    let flag = engine.termination_flag();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.expect("install ctrl-c handler");
        println!();
        log::warn!("interrupt received, finishing this generation");
        flag.store(true, Ordering::Relaxed);
    });
    let bar = evodeck::progress(engine.config().generations);
    engine.run(&mut |stats| {
        bar.set_position(stats.generation as u64 + 1);
    })?;
    bar.finish_and_clear();
    let best = engine.get_best_genomes(save_top_n);
    if best.is_empty() {
        log::warn!("nothing to export");
        return Ok(());
    }
    for individual in best.iter() {
        log::info!(
            "top genome {} fitness {:.4}",
            individual.genome.name,
            individual.fitness
        );
    }
    let genomes: Vec<&Genome> = best.iter().map(|i| &i.genome).collect();
    evodeck::save::writer::export_genomes(output_dir, &genomes)?;
    log::info!("exported {} genomes to {}", genomes.len(), output_dir.display());
    Ok(())
}

fn playtest(path: &PathBuf, games: usize, agent: &str, seed: u64, workers: usize) -> Result<()> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("read genome {}", path.display()))?;
    let genome = Genome::from_json(&body)?;
    let violations = genome.validate();
    for violation in violations.iter() {
        log::warn!("{}: {}", violation.field, violation.message);
    }
    let kind = match agent.to_ascii_lowercase().as_str() {
        "random" => AgentKind::Random,
        "greedy" => AgentKind::Greedy,
        other => match other.strip_prefix("mcts") {
            Some(rest) => {
                let asked: usize = rest.trim_start_matches('@').parse().unwrap_or(500);
                // snap to the nearest supported search budget
                let iterations = evodeck::MCTS_PRESETS
                    .into_iter()
                    .min_by_key(|p| p.abs_diff(asked))
                    .unwrap_or(500);
                AgentKind::Mcts(iterations)
            }
            None => bail!("unknown agent {:?}", agent),
        },
    };
    let workers = match workers {
        0 => num_cpus::get(),
        n => n,
    };
    let metrics =
        evodeck::simulation::run_batch_parallel(&genome, kind, games, seed, workers);
    println!("{} over {} games ({} agent):", genome.name, metrics.games, kind);
    for p in 0..genome.num_players() {
        println!("  p{} wins {:>5} ({:.1}%)", p, metrics.wins[p], 100.0 * metrics.win_rate(p));
    }
    println!("  draws {:>5}", metrics.draws);
    println!("  errors {:>4}", metrics.errors);
    println!("  avg turns {:.1}", metrics.avg_turns());
    Ok(())
}
