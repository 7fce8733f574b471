use super::policy::Policy;
use crate::gameplay::moves::Move;
use crate::genome::Genome;
use crate::state::GameState;
use rand::rngs::SmallRng;
use rand::Rng;

/// uniform over whatever is legal
pub struct RandomPolicy;

impl Policy for RandomPolicy {
    fn choose(
        &mut self,
        _state: &GameState,
        _genome: &Genome,
        moves: &[Move],
        rng: &mut SmallRng,
    ) -> Move {
        moves[rng.random_range(0..moves.len())]
    }
    fn name(&self) -> &'static str {
        "random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::generator;
    use crate::genome::seeds;
    use rand::SeedableRng;

    #[test]
    fn always_picks_a_legal_move() {
        let genome = seeds::president();
        let mut state = GameState::default();
        let mut rng = SmallRng::seed_from_u64(15);
        state.deal(&genome, &mut rng);
        let moves = generator::legal_moves(&state, &genome);
        let mut policy = RandomPolicy;
        for _ in 0..50 {
            let mv = policy.choose(&state, &genome, &moves, &mut rng);
            assert!(moves.contains(&mv));
        }
    }
}
