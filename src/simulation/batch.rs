//! batch evaluation. seeds for every game are drawn up front from the
//! batch seed on a single thread, so the set of games is fixed before
//! any worker runs; aggregation is a commutative reduction, making the
//! totals independent of worker finish order.

use super::metrics::BatchMetrics;
use super::runner;
use crate::genome::Genome;
use crate::players::policy::Agents;
use crate::players::AgentKind;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

pub fn game_seeds(batch_seed: u64, games: usize) -> Vec<u64> {
    let mut master = SmallRng::seed_from_u64(batch_seed);
    (0..games).map(|_| master.random::<u64>()).collect()
}

pub fn run_batch(genome: &Genome, kind: AgentKind, games: usize, batch_seed: u64) -> BatchMetrics {
    let mut agents = Agents::shared(kind.build());
    let mut metrics = BatchMetrics::default();
    for seed in game_seeds(batch_seed, games) {
        let result = runner::run_single_game(genome, &mut agents, seed);
        metrics.absorb(&result);
    }
    metrics
}

pub fn run_batch_parallel(
    genome: &Genome,
    kind: AgentKind,
    games: usize,
    batch_seed: u64,
    workers: usize,
) -> BatchMetrics {
    use rayon::iter::IntoParallelIterator;
    use rayon::iter::ParallelIterator;
    let seeds = game_seeds(batch_seed, games);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .expect("build worker pool");
    pool.install(|| {
        seeds
            .into_par_iter()
            .map(|seed| {
                let mut agents = Agents::shared(kind.build());
                runner::run_single_game(genome, &mut agents, seed)
            })
            .fold(BatchMetrics::default, |mut acc, result| {
                acc.absorb(&result);
                acc
            })
            .reduce(BatchMetrics::default, |mut a, b| {
                a.merge(&b);
                a
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::seeds;

    #[test]
    fn war_hundred_games_is_fair() {
        let genome = seeds::war();
        let metrics = run_batch(&genome, AgentKind::Random, 100, 42);
        assert!(metrics.games == 100);
        assert!(metrics.finished() == 100);
        assert!(metrics.errors <= 5);
        assert!(metrics.avg_turns() >= 10.0);
        for p in 0..2 {
            let rate = metrics.win_rate(p);
            assert!(rate >= 0.30 && rate <= 0.70, "p{} at {}", p, rate);
        }
    }

    #[test]
    fn seeds_are_reproducible() {
        assert!(game_seeds(7, 32) == game_seeds(7, 32));
        assert!(game_seeds(7, 32) != game_seeds(8, 32));
    }

    #[test]
    fn parallel_agrees_with_serial_within_tolerance() {
        let genome = seeds::crazy_eights();
        let serial = run_batch(&genome, AgentKind::Random, 60, 99);
        let parallel = run_batch_parallel(&genome, AgentKind::Random, 60, 99, 4);
        assert!(parallel.games == serial.games);
        for p in 0..2 {
            let gap = (serial.win_rate(p) - parallel.win_rate(p)).abs();
            assert!(gap <= 0.10, "p{} win-rate gap {}", p, gap);
        }
        let (a, b) = (serial.avg_turns(), parallel.avg_turns());
        assert!((a - b).abs() <= 0.20 * a.max(b));
    }
}
