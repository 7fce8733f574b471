//! population diversity: the mean pairwise structural distance between
//! genomes. small populations compare every pair; large ones sample.

use crate::genome::Genome;
use rand::rngs::SmallRng;
use rand::Rng;

const EXHAUSTIVE_LIMIT: usize = 50;
const SAMPLE_PAIRS: usize = 100;

/// average of five normalized feature gaps
pub fn distance(a: &Genome, b: &Genome) -> f64 {
    let phases = (a.phases().len() as f64 - b.phases().len() as f64).abs() / 5.0;
    let effects = (a.effects.len() as f64 - b.effects.len() as f64).abs() / 3.0;
    let wins = (a.win_conditions.len() as f64 - b.win_conditions.len() as f64).abs() / 2.0;
    let turns = (a.turn_structure.max_turns as f64 - b.turn_structure.max_turns as f64).abs()
        / 1000.0;
    let cards =
        (a.setup.cards_per_player as f64 - b.setup.cards_per_player as f64).abs() / 26.0;
    (phases.min(1.0) + effects.min(1.0) + wins.min(1.0) + turns.min(1.0) + cards.min(1.0)) / 5.0
}

pub fn population_diversity(genomes: &[&Genome], rng: &mut SmallRng) -> f64 {
    let n = genomes.len();
    if n < 2 {
        return 0.0;
    }
    if n <= EXHAUSTIVE_LIMIT {
        let mut total = 0.0;
        let mut pairs = 0usize;
        for i in 0..n {
            for j in (i + 1)..n {
                total += distance(genomes[i], genomes[j]);
                pairs += 1;
            }
        }
        return total / pairs as f64;
    }
    let mut total = 0.0;
    for _ in 0..SAMPLE_PAIRS {
        let i = rng.random_range(0..n);
        let j = rng.random_range(0..n);
        if i != j {
            total += distance(genomes[i], genomes[j]);
        }
    }
    total / SAMPLE_PAIRS as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::seeds;
    use rand::SeedableRng;

    #[test]
    fn identical_clones_have_no_diversity() {
        let war = seeds::war();
        let clones: Vec<&Genome> = std::iter::repeat(&war).take(10).collect();
        let mut rng = SmallRng::seed_from_u64(70);
        assert!(population_diversity(&clones, &mut rng) == 0.0);
    }

    #[test]
    fn distinct_seeds_beat_clones() {
        let roster = seeds::all();
        let distinct: Vec<&Genome> = roster.iter().take(10).collect();
        let war = seeds::war();
        let clones: Vec<&Genome> = std::iter::repeat(&war).take(10).collect();
        let mut rng = SmallRng::seed_from_u64(71);
        let varied = population_diversity(&distinct, &mut rng);
        let flat = population_diversity(&clones, &mut rng);
        assert!(varied > flat);
        assert!(varied > 0.0);
    }

    #[test]
    fn distance_is_symmetric_and_bounded() {
        let roster = seeds::all();
        for a in roster.iter() {
            for b in roster.iter() {
                let d = distance(a, b);
                assert!((0.0..=1.0).contains(&d));
                assert!((d - distance(b, a)).abs() < 1e-12);
            }
        }
    }
}
