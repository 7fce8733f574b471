//! the generational loop: evaluate in parallel, select, recombine,
//! mutate, watch diversity and plateau, checkpoint, resume.

use super::crossover;
use super::diversity;
use super::operators::Registry;
use super::skill;
use super::skill::SkillConfig;
use super::skill::SkillReport;
use crate::fitness;
use crate::fitness::FitnessBreakdown;
use crate::fitness::FitnessStyle;
use crate::genome::seeds;
use crate::genome::Genome;
use crate::players::AgentKind;
use crate::save::Checkpoint;
use crate::simulation::batch;
use crate::Fitness;
use anyhow::bail;
use anyhow::Result;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    pub elitism_rate: f64,
    pub crossover_rate: f64,
    pub tournament_size: usize,
    pub games_per_eval: usize,
    pub style: FitnessStyle,
    /// 0 means derive from the wall clock
    pub seed: u64,
    /// 0 means one worker per available core
    pub workers: usize,
    /// share of the initial population kept as unmutated seed clones
    pub seed_ratio: f64,
    pub diversity_threshold: f64,
    pub plateau_window: usize,
    pub improvement_threshold: f64,
    pub skill: SkillConfig,
    /// checkpoint every n generations; 0 disables periodic saves
    pub checkpoint_interval: usize,
    pub checkpoint_path: Option<PathBuf>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            elitism_rate: 0.10,
            crossover_rate: 0.70,
            tournament_size: 3,
            games_per_eval: 100,
            style: FitnessStyle::Balanced,
            seed: 0,
            workers: 0,
            seed_ratio: 0.5,
            diversity_threshold: 0.12,
            plateau_window: 10,
            improvement_threshold: 0.01,
            skill: SkillConfig::default(),
            checkpoint_interval: 10,
            checkpoint_path: None,
        }
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            bail!("population must hold at least two individuals");
        }
        if !(0.0..=1.0).contains(&self.elitism_rate) {
            bail!("elitism rate must sit in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            bail!("crossover rate must sit in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.seed_ratio) {
            bail!("seed ratio must sit in [0, 1]");
        }
        if self.tournament_size == 0 {
            bail!("tournament size must be positive");
        }
        if self.games_per_eval == 0 {
            bail!("at least one game per evaluation is required");
        }
        Ok(())
    }

    fn worker_count(&self) -> usize {
        match self.workers {
            0 => num_cpus::get(),
            n => n,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Individual {
    pub genome: Genome,
    pub fitness: Fitness,
    pub evaluated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness_metrics: Option<FitnessBreakdown>,
}

impl Individual {
    pub fn unevaluated(genome: Genome) -> Self {
        Self {
            genome,
            fitness: 0.0,
            evaluated: false,
            fitness_metrics: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenStats {
    pub generation: usize,
    pub best: Fitness,
    pub avg: Fitness,
    pub diversity: f64,
    pub evaluations: usize,
    pub timestamp: u64,
}

pub struct EvolutionEngine {
    config: EvolutionConfig,
    population: Vec<Individual>,
    generation: usize,
    best_ever: Option<Individual>,
    stats_history: Vec<GenStats>,
    rng: SmallRng,
    aggressive: bool,
    evaluations: usize,
    terminate: Arc<AtomicBool>,
    skill_cache: HashMap<String, SkillReport>,
}

impl EvolutionEngine {
    pub fn new(mut config: EvolutionConfig) -> Result<Self> {
        config.validate()?;
        if config.seed == 0 {
            config.seed = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time moves slow")
                .as_nanos() as u64;
        }
        let rng = SmallRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            population: Vec::new(),
            generation: 0,
            best_ever: None,
            stats_history: Vec::new(),
            rng,
            aggressive: false,
            evaluations: 0,
            terminate: Arc::new(AtomicBool::new(false)),
            skill_cache: HashMap::new(),
        })
    }

    /// rebuild an engine from a stored snapshot
    pub fn resume(checkpoint: Checkpoint) -> Result<Self> {
        checkpoint.config.validate()?;
        let rng = SmallRng::seed_from_u64(checkpoint.rng_seed);
        Ok(Self {
            config: checkpoint.config,
            population: checkpoint.population,
            generation: checkpoint.generation,
            best_ever: checkpoint.best_ever,
            stats_history: checkpoint.stats_history,
            rng,
            aggressive: false,
            evaluations: 0,
            terminate: Arc::new(AtomicBool::new(false)),
            skill_cache: HashMap::new(),
        })
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }
    pub fn generation(&self) -> usize {
        self.generation
    }
    pub fn population(&self) -> &[Individual] {
        &self.population
    }
    pub fn stats_history(&self) -> &[GenStats] {
        &self.stats_history
    }
    pub fn best_ever(&self) -> Option<&Individual> {
        self.best_ever.as_ref()
    }
    /// flip this flag (e.g. from a signal handler) and the engine stops
    /// at the next generation boundary, checkpointing on the way out
    pub fn termination_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.terminate)
    }

    /// fill the initial population from the seed roster: a configurable
    /// share as straight clones, the rest pushed once through the
    /// default mutation pipeline
    pub fn initialize(&mut self) {
        let roster = seeds::all();
        let n = self.config.population_size;
        let pristine = (n as f64 * self.config.seed_ratio).round() as usize;
        let registry = Registry::default_pipeline();
        self.population.clear();
        for i in 0..n {
            let base = roster[i % roster.len()].clone();
            let genome = match i < pristine {
                true => base,
                false => {
                    let mut mutant = registry.apply_all(&base, &mut self.rng);
                    mutant.name = format!("{}~{}", base.name, i);
                    mutant
                }
            };
            self.population.push(Individual::unevaluated(genome));
        }
        log::info!(
            "population initialized: {} individuals ({} pristine seeds)",
            n,
            pristine.min(n)
        );
    }

    pub fn run<F: FnMut(&GenStats)>(&mut self, callback: &mut F) -> Result<()> {
        if self.population.is_empty() {
            self.initialize();
        }
        while self.generation < self.config.generations {
            if self.terminate.load(Ordering::Relaxed) {
                log::warn!("termination requested, stopping at generation {}", self.generation);
                break;
            }
            self.evaluate_population();
            if self.should_probe_skill() {
                self.apply_skill_penalties();
            }
            let stats = self.collect_stats();
            log::info!(
                "gen {:>4} best {:.4} avg {:.4} diversity {:.3} evals {}",
                stats.generation,
                stats.best,
                stats.avg,
                stats.diversity,
                stats.evaluations
            );
            self.track_best();
            self.adjust_pipeline(stats.diversity);
            callback(&stats);
            self.stats_history.push(stats);
            self.generation += 1;
            if self.plateaued() {
                log::info!("fitness plateau detected, stopping early");
                break;
            }
            if self.generation < self.config.generations {
                self.reproduce();
            }
            self.maybe_checkpoint(false)?;
        }
        self.maybe_checkpoint(true)?;
        Ok(())
    }

    fn evaluate_population(&mut self) {
        use rayon::iter::IntoParallelIterator;
        use rayon::iter::ParallelIterator;
        let pending: Vec<usize> = self
            .population
            .iter()
            .enumerate()
            .filter(|(_, ind)| !ind.evaluated)
            .map(|(i, _)| i)
            .collect();
        if pending.is_empty() {
            return;
        }
        // per-genome batch seeds come off the master rng on this thread,
        // before any worker runs
        let jobs: Vec<(usize, u64)> = pending
            .iter()
            .map(|&i| (i, self.rng.random::<u64>()))
            .collect();
        let games = self.config.games_per_eval;
        let style = self.config.style;
        let genomes = &self.population;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.worker_count())
            .build()
            .expect("build worker pool");
        let results: Vec<(usize, Fitness, FitnessBreakdown)> = pool.install(|| {
            jobs.into_par_iter()
                .map(|(i, batch_seed)| {
                    let genome = &genomes[i].genome;
                    let metrics = batch::run_batch(genome, AgentKind::Random, games, batch_seed);
                    let breakdown = fitness::evaluate(genome, &metrics, style);
                    let score = match breakdown.valid {
                        true => breakdown.total,
                        false => 0.0,
                    };
                    (i, score, breakdown)
                })
                .collect()
        });
        for (i, score, breakdown) in results {
            let individual = &mut self.population[i];
            individual.fitness = score;
            individual.evaluated = true;
            individual.fitness_metrics = Some(breakdown);
            self.evaluations += 1;
        }
    }

    fn collect_stats(&mut self) -> GenStats {
        let best = self
            .population
            .iter()
            .map(|i| i.fitness)
            .fold(0.0, f64::max);
        let avg = match self.population.len() {
            0 => 0.0,
            n => self.population.iter().map(|i| i.fitness).sum::<f64>() / n as f64,
        };
        let genomes: Vec<&Genome> = self.population.iter().map(|i| &i.genome).collect();
        let diversity = diversity::population_diversity(&genomes, &mut self.rng);
        GenStats {
            generation: self.generation,
            best,
            avg,
            diversity,
            evaluations: self.evaluations,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time moves slow")
                .as_secs(),
        }
    }

    fn track_best(&mut self) {
        let champion = self
            .population
            .iter()
            .max_by(|a, b| a.fitness.partial_cmp(&b.fitness).unwrap_or(std::cmp::Ordering::Equal));
        if let Some(champion) = champion {
            let dethroned = self
                .best_ever
                .as_ref()
                .map(|b| champion.fitness > b.fitness)
                .unwrap_or(true);
            if dethroned {
                self.best_ever = Some(champion.clone());
            }
        }
    }

    /// low diversity flips mutation to the aggressive pipeline; a solid
    /// recovery flips it back
    fn adjust_pipeline(&mut self, diversity: f64) {
        if !self.aggressive && diversity < self.config.diversity_threshold {
            self.aggressive = true;
            log::info!("diversity {:.3} below threshold, aggressive mutation on", diversity);
        } else if self.aggressive && diversity > 1.5 * self.config.diversity_threshold {
            self.aggressive = false;
            log::info!("diversity {:.3} recovered, aggressive mutation off", diversity);
        }
    }

    fn plateaued(&self) -> bool {
        let window = self.config.plateau_window;
        if window == 0 || self.stats_history.len() < window {
            return false;
        }
        let recent = &self.stats_history[self.stats_history.len() - window..];
        let first = recent.first().map(|s| s.best).unwrap_or(0.0);
        let last = recent.last().map(|s| s.best).unwrap_or(0.0);
        let improvement = (last - first) / first.max(1e-9);
        improvement < self.config.improvement_threshold
    }

    fn reproduce(&mut self) {
        let n = self.config.population_size;
        self.population.sort_by(|a, b| {
            b.fitness
                .partial_cmp(&a.fitness)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let elites = ((n as f64 * self.config.elitism_rate).ceil() as usize).min(n);
        let mut next: Vec<Individual> = self.population[..elites.min(self.population.len())]
            .iter()
            .cloned()
            .collect();
        let registry = match self.aggressive {
            true => Registry::aggressive_pipeline(),
            false => Registry::default_pipeline(),
        };
        while next.len() < n {
            let pa = self.tournament();
            let pb = self.tournament();
            let (ca, cb) = match self.rng.random::<f64>() < self.config.crossover_rate {
                true => match self.rng.random::<bool>() {
                    true => crossover::uniform(&pa, &pb, &mut self.rng),
                    false => crossover::single_point(&pa, &pb, &mut self.rng),
                },
                false => (pa.clone(), pb.clone()),
            };
            for child in [ca, cb] {
                if next.len() >= n {
                    break;
                }
                let mutated = registry.apply_all(&child, &mut self.rng);
                next.push(Individual::unevaluated(mutated));
            }
        }
        self.population = next;
    }

    fn tournament(&mut self) -> Genome {
        let k = self.config.tournament_size.max(1);
        let mut best: Option<&Individual> = None;
        for _ in 0..k {
            let pick = &self.population[self.rng.random_range(0..self.population.len())];
            let better = best.map(|b| pick.fitness > b.fitness).unwrap_or(true);
            if better {
                best = Some(pick);
            }
        }
        best.expect("population is never empty during reproduction")
            .genome
            .clone()
    }

    fn should_probe_skill(&self) -> bool {
        let f = self.config.skill.frequency;
        f > 0 && self.generation > 0 && self.generation % f == 0
    }

    /// probe the top slice and multiply down the fitness of genomes with
    /// heavy first-mover advantage or the wrong skill profile for the
    /// configured style
    fn apply_skill_penalties(&mut self) {
        let skill_config = self.config.skill.clone();
        let count = ((self.population.len() as f64 * skill_config.top_fraction).ceil() as usize)
            .clamp(1, self.population.len());
        let mut order: Vec<usize> = (0..self.population.len()).collect();
        order.sort_by(|&a, &b| {
            self.population[b]
                .fitness
                .partial_cmp(&self.population[a].fitness)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let probe_seed = self.rng.random::<u64>();
        for &i in order.iter().take(count) {
            let name = self.population[i].genome.name.clone();
            let report = match self.skill_cache.get(&name).copied() {
                Some(cached) => cached,
                None => {
                    let report = skill::evaluate_skill(
                        &self.population[i].genome,
                        skill_config.games,
                        skill_config.mcts_iterations,
                        probe_seed,
                    );
                    self.skill_cache.insert(name.clone(), report);
                    report
                }
            };
            let individual = &mut self.population[i];
            if report.first_player_advantage.abs() > skill_config.fpa_threshold {
                individual.fitness *= 1.0 - skill_config.fpa_weight;
            }
            let wrong_profile = match self.config.style {
                FitnessStyle::Party => report.skill_score > skill_config.low_skill_threshold,
                _ => report.skill_score < skill_config.low_skill_threshold,
            };
            if wrong_profile {
                individual.fitness *= 1.0 - skill_config.low_skill_weight;
            }
            log::debug!(
                "skill probe {}: greedy {:.2} mcts {:.2} fpa {:+.2} -> fitness {:.4}",
                name,
                report.greedy_win_rate,
                report.mcts_win_rate,
                report.first_player_advantage,
                individual.fitness
            );
        }
    }

    /// de-duplicated-by-name top performers, best-ever included
    pub fn get_best_genomes(&self, n: usize) -> Vec<Individual> {
        let mut pool: Vec<Individual> = self.population.clone();
        if let Some(ref best) = self.best_ever {
            pool.push(best.clone());
        }
        pool.sort_by(|a, b| {
            b.fitness
                .partial_cmp(&a.fitness)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut seen = std::collections::HashSet::new();
        pool.retain(|ind| seen.insert(ind.genome.name.clone()));
        pool.truncate(n);
        pool
    }

    pub fn snapshot(&self) -> Checkpoint {
        Checkpoint {
            config: self.config.clone(),
            generation: self.generation,
            population: self.population.clone(),
            best_ever: self.best_ever.clone(),
            stats_history: self.stats_history.clone(),
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time moves slow")
                .as_secs(),
            rng_seed: self
                .config
                .seed
                .wrapping_add((self.generation as u64).wrapping_mul(0x9E3779B97F4A7C15)),
            version: crate::save::CHECKPOINT_VERSION.to_string(),
        }
    }

    fn maybe_checkpoint(&self, terminal: bool) -> Result<()> {
        let Some(ref path) = self.config.checkpoint_path else {
            return Ok(());
        };
        let interval = self.config.checkpoint_interval;
        let periodic = interval > 0 && self.generation > 0 && self.generation % interval == 0;
        if terminal || periodic {
            self.snapshot().save(path)?;
            log::info!("checkpoint written to {} at generation {}", path.display(), self.generation);
        }
        Ok(())
    }
}
