//! UCT search. each call builds a private node arena: nodes point at
//! parents by back-index and at children by forward index, so the tree
//! needs no shared ownership and dies with the search.

use super::policy::Agents;
use super::policy::Policy;
use super::random::RandomPolicy;
use crate::gameplay::generator;
use crate::gameplay::moves::Move;
use crate::gameplay::wincheck;
use crate::genome::Genome;
use crate::simulation::metrics::GameMetrics;
use crate::simulation::runner;
use crate::state::GameState;
use rand::rngs::SmallRng;
use rand::Rng;

pub struct MctsPolicy {
    iterations: usize,
}

struct Node {
    mv: Option<Move>,
    parent: Option<usize>,
    /// seat that took `mv`; rollout wins are credited against it
    actor: i32,
    children: Vec<usize>,
    untried: Vec<Move>,
    visits: f64,
    wins: f64,
}

impl MctsPolicy {
    pub fn new(iterations: usize) -> Self {
        Self { iterations }
    }

    fn select(&self, arena: &[Node], node: usize) -> usize {
        let ln_n = arena[node].visits.max(1.0).ln();
        let ucb = |i: usize| {
            let child = &arena[i];
            child.wins / child.visits + crate::UCT_EXPLORATION * (ln_n / child.visits).sqrt()
        };
        arena[node]
            .children
            .iter()
            .copied()
            .max_by(|&a, &b| ucb(a).partial_cmp(&ucb(b)).unwrap_or(std::cmp::Ordering::Equal))
            .expect("selection only runs on expanded nodes")
    }

    /// pure-random playout to terminal, capped to keep pathological
    /// rule sets from spinning; an uncapped winner is credited, an
    /// unresolved rollout counts as a win for nobody
    fn rollout(
        &self,
        sim: &mut GameState,
        genome: &Genome,
        cap: usize,
        agents: &mut Agents,
        rng: &mut SmallRng,
        scratch: &mut GameMetrics,
    ) -> i32 {
        for _ in 0..cap {
            if sim.is_over() || sim.turn_number >= genome.turn_structure.max_turns {
                break;
            }
            if let Some(winner) = wincheck::check_win(sim, genome) {
                wincheck::declare(sim, genome, winner);
                break;
            }
            let moves = generator::legal_moves(sim, genome);
            if moves.is_empty() {
                break;
            }
            let mv = moves[rng.random_range(0..moves.len())];
            runner::step(sim, genome, mv, agents, rng, scratch);
        }
        sim.winner_id
    }
}

impl Policy for MctsPolicy {
    fn choose(
        &mut self,
        state: &GameState,
        genome: &Genome,
        moves: &[Move],
        rng: &mut SmallRng,
    ) -> Move {
        if moves.len() == 1 {
            return moves[0];
        }
        let cap = genome.turn_structure.max_turns * crate::ROLLOUT_CAP_FACTOR;
        let mut arena: Vec<Node> = Vec::with_capacity(self.iterations + 1);
        arena.push(Node {
            mv: None,
            parent: None,
            actor: -1,
            children: Vec::new(),
            untried: moves.to_vec(),
            visits: 0.0,
            wins: 0.0,
        });
        for _ in 0..self.iterations {
            let mut scratch = GameMetrics::default();
            let mut rollout_agents = Agents::shared(Box::new(RandomPolicy));
            let mut sim = state.clone();
            let mut node = 0usize;
            while arena[node].untried.is_empty() && !arena[node].children.is_empty() {
                node = self.select(&arena, node);
                if let Some(mv) = arena[node].mv {
                    runner::step(&mut sim, genome, mv, &mut rollout_agents, rng, &mut scratch);
                }
            }
            if !arena[node].untried.is_empty() && !sim.is_over() {
                let pick = rng.random_range(0..arena[node].untried.len());
                let mv = arena[node].untried.swap_remove(pick);
                let actor = sim.current_player as i32;
                runner::step(&mut sim, genome, mv, &mut rollout_agents, rng, &mut scratch);
                let untried = generator::legal_moves(&sim, genome);
                let child = arena.len();
                arena.push(Node {
                    mv: Some(mv),
                    parent: Some(node),
                    actor,
                    children: Vec::new(),
                    untried,
                    visits: 0.0,
                    wins: 0.0,
                });
                arena[node].children.push(child);
                node = child;
            }
            let winner = self.rollout(
                &mut sim,
                genome,
                cap,
                &mut rollout_agents,
                rng,
                &mut scratch,
            );
            let mut cursor = Some(node);
            while let Some(i) = cursor {
                arena[i].visits += 1.0;
                if winner >= 0 && winner == arena[i].actor {
                    arena[i].wins += 1.0;
                }
                cursor = arena[i].parent;
            }
        }
        // final action: most-visited root child
        arena[0]
            .children
            .iter()
            .copied()
            .max_by(|&a, &b| {
                arena[a]
                    .visits
                    .partial_cmp(&arena[b].visits)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .and_then(|best| arena[best].mv)
            .unwrap_or(moves[0])
    }
    fn name(&self) -> &'static str {
        "mcts"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::seeds;
    use rand::SeedableRng;

    #[test]
    fn returns_a_legal_move() {
        let genome = seeds::crazy_eights();
        let mut state = GameState::default();
        let mut rng = SmallRng::seed_from_u64(33);
        state.deal(&genome, &mut rng);
        let moves = generator::legal_moves(&state, &genome);
        let mut policy = MctsPolicy::new(50);
        let mv = policy.choose(&state, &genome, &moves, &mut rng);
        assert!(moves.contains(&mv));
    }

    #[test]
    fn single_option_short_circuits() {
        let genome = seeds::war();
        let mut state = GameState::default();
        let mut rng = SmallRng::seed_from_u64(34);
        state.deal(&genome, &mut rng);
        let only = vec![Move::play(0, 0, crate::cards::location::Location::Tableau)];
        let mut policy = MctsPolicy::new(1000);
        assert!(policy.choose(&state, &genome, &only, &mut rng) == only[0]);
    }

    #[test]
    fn search_is_deterministic_under_a_fixed_rng() {
        let genome = seeds::president();
        let mut state = GameState::default();
        state.deal(&genome, &mut SmallRng::seed_from_u64(35));
        let moves = generator::legal_moves(&state, &genome);
        let mut policy = MctsPolicy::new(100);
        let a = policy.choose(&state, &genome, &moves, &mut SmallRng::seed_from_u64(9));
        let b = policy.choose(&state, &genome, &moves, &mut SmallRng::seed_from_u64(9));
        assert!(a == b);
    }
}
