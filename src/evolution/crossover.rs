//! recombination. both operators return two children with bumped
//! generation counters; parents are read-only. offspring coherence is
//! not enforced here: the fitness penalties are the selection pressure
//! against nonsense combinations.

use crate::genome::Genome;
use rand::rngs::SmallRng;
use rand::Rng;

/// per-field coin flips on setup and turn scalars, one-point splice of
/// the phase lists at independent cut points, atomic swap of each of
/// the rule lists
pub fn uniform(a: &Genome, b: &Genome, rng: &mut SmallRng) -> (Genome, Genome) {
    let mut x = a.clone();
    let mut y = b.clone();
    if rng.random::<bool>() {
        std::mem::swap(&mut x.setup.num_players, &mut y.setup.num_players);
    }
    if rng.random::<bool>() {
        std::mem::swap(&mut x.setup.cards_per_player, &mut y.setup.cards_per_player);
    }
    if rng.random::<bool>() {
        std::mem::swap(&mut x.setup.tableau_size, &mut y.setup.tableau_size);
    }
    if rng.random::<bool>() {
        std::mem::swap(&mut x.setup.starting_chips, &mut y.setup.starting_chips);
    }
    if rng.random::<bool>() {
        std::mem::swap(&mut x.setup.deal_to_tableau, &mut y.setup.deal_to_tableau);
    }
    if rng.random::<bool>() {
        std::mem::swap(
            &mut x.turn_structure.max_turns,
            &mut y.turn_structure.max_turns,
        );
    }
    if rng.random::<bool>() {
        std::mem::swap(
            &mut x.turn_structure.tableau_mode,
            &mut y.turn_structure.tableau_mode,
        );
    }
    if rng.random::<bool>() {
        std::mem::swap(
            &mut x.turn_structure.sequence_direction,
            &mut y.turn_structure.sequence_direction,
        );
    }
    if rng.random::<bool>() {
        std::mem::swap(
            &mut x.turn_structure.is_trick_based,
            &mut y.turn_structure.is_trick_based,
        );
    }
    let cut_a = rng.random_range(0..=a.turn_structure.phases.len());
    let cut_b = rng.random_range(0..=b.turn_structure.phases.len());
    x.turn_structure.phases = a.turn_structure.phases[..cut_a]
        .iter()
        .chain(b.turn_structure.phases[cut_b..].iter())
        .cloned()
        .collect();
    y.turn_structure.phases = b.turn_structure.phases[..cut_b]
        .iter()
        .chain(a.turn_structure.phases[cut_a..].iter())
        .cloned()
        .collect();
    if x.turn_structure.phases.is_empty() {
        x.turn_structure.phases = a.turn_structure.phases.clone();
    }
    if y.turn_structure.phases.is_empty() {
        y.turn_structure.phases = b.turn_structure.phases.clone();
    }
    if rng.random::<bool>() {
        std::mem::swap(&mut x.effects, &mut y.effects);
    }
    if rng.random::<bool>() {
        std::mem::swap(&mut x.card_scoring, &mut y.card_scoring);
    }
    if rng.random::<bool>() {
        std::mem::swap(&mut x.win_conditions, &mut y.win_conditions);
    }
    if rng.random::<bool>() {
        std::mem::swap(&mut x.hand_eval, &mut y.hand_eval);
    }
    if rng.random::<bool>() {
        std::mem::swap(&mut x.teams, &mut y.teams);
    }
    christen(&mut x, &mut y, a, b, rng);
    (x, y)
}

/// pick one category and trade the whole block
pub fn single_point(a: &Genome, b: &Genome, rng: &mut SmallRng) -> (Genome, Genome) {
    let mut x = a.clone();
    let mut y = b.clone();
    match rng.random_range(0..4) {
        0 => std::mem::swap(&mut x.setup, &mut y.setup),
        1 => std::mem::swap(&mut x.turn_structure, &mut y.turn_structure),
        2 => {
            std::mem::swap(&mut x.win_conditions, &mut y.win_conditions);
            std::mem::swap(&mut x.card_scoring, &mut y.card_scoring);
        }
        _ => {
            std::mem::swap(&mut x.effects, &mut y.effects);
            std::mem::swap(&mut x.hand_eval, &mut y.hand_eval);
            std::mem::swap(&mut x.teams, &mut y.teams);
        }
    }
    christen(&mut x, &mut y, a, b, rng);
    (x, y)
}

/// children get a fresh generation number and a traceable name
fn christen(x: &mut Genome, y: &mut Genome, a: &Genome, b: &Genome, rng: &mut SmallRng) {
    let generation = a.generation.max(b.generation) + 1;
    let tag: u16 = rng.random();
    x.generation = generation;
    y.generation = generation;
    x.name = format!("{}+{}-{:04x}a", stem(&a.name), stem(&b.name), tag);
    y.name = format!("{}+{}-{:04x}b", stem(&a.name), stem(&b.name), tag);
}

fn stem(name: &str) -> &str {
    let end = name
        .char_indices()
        .find(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i)
        .unwrap_or(name.len());
    &name[..end.min(12)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::seeds;
    use rand::SeedableRng;

    #[test]
    fn parents_survive_recombination() {
        let a = seeds::hearts();
        let b = seeds::simple_poker();
        let (fa, fb) = (a.clone(), b.clone());
        let mut rng = SmallRng::seed_from_u64(60);
        for _ in 0..20 {
            let _ = uniform(&a, &b, &mut rng);
            let _ = single_point(&a, &b, &mut rng);
        }
        assert!(a == fa);
        assert!(b == fb);
    }

    #[test]
    fn children_advance_a_generation() {
        let mut a = seeds::war();
        a.generation = 4;
        let b = seeds::go_fish();
        let mut rng = SmallRng::seed_from_u64(61);
        let (x, y) = uniform(&a, &b, &mut rng);
        assert!(x.generation == 5);
        assert!(y.generation == 5);
        assert!(x.name != y.name);
    }

    #[test]
    fn splice_keeps_phases_non_empty() {
        let a = seeds::president();
        let b = seeds::draw_poker();
        let mut rng = SmallRng::seed_from_u64(62);
        for _ in 0..100 {
            let (x, y) = uniform(&a, &b, &mut rng);
            assert!(!x.turn_structure.phases.is_empty());
            assert!(!y.turn_structure.phases.is_empty());
        }
    }

    #[test]
    fn single_point_trades_whole_blocks() {
        let a = seeds::hearts();
        let b = seeds::simple_poker();
        let mut rng = SmallRng::seed_from_u64(63);
        let mut saw_setup_swap = false;
        for _ in 0..50 {
            let (x, _) = single_point(&a, &b, &mut rng);
            if x.setup == b.setup {
                saw_setup_swap = true;
            }
        }
        assert!(saw_setup_swap);
    }
}
