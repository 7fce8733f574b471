use super::policy::Policy;
use crate::gameplay::betting;
use crate::gameplay::betting::BetAction;
use crate::gameplay::moves::Move;
use crate::genome::Genome;
use crate::state::GameState;
use rand::rngs::SmallRng;

/// one-ply heuristic: prefer shedding cards, break ties on rank.
/// betting runs on pot odds against the cheap hand-strength estimate.
pub struct GreedyPolicy;

impl Policy for GreedyPolicy {
    fn choose(
        &mut self,
        state: &GameState,
        _genome: &Genome,
        moves: &[Move],
        _rng: &mut SmallRng,
    ) -> Move {
        let best = moves
            .iter()
            .max_by(|a, b| {
                self.score(state, a)
                    .partial_cmp(&self.score(state, b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("caller guarantees at least one move");
        *best
    }
    fn name(&self) -> &'static str {
        "greedy"
    }
}

impl GreedyPolicy {
    fn score(&self, state: &GameState, mv: &Move) -> f64 {
        let seat = state.actor();
        if let Some(index) = mv.hand_index() {
            let rank = seat
                .hand
                .get(index)
                .map(|c| c.rank() as u8 as f64)
                .unwrap_or(0.0);
            return 10.0 + rank;
        }
        if let Some((rank, size)) = mv.rank_group() {
            return 10.0 * size as f64 + rank as f64;
        }
        if let Some(action) = mv.bet_action() {
            return self.bet_score(state, action);
        }
        if let Some((value, nil)) = mv.bid_value() {
            return self.bid_score(state, value, nil);
        }
        match mv.card {
            crate::gameplay::moves::DRAW => 1.0,
            crate::gameplay::moves::CHALLENGE => 2.0,
            _ => 0.5,
        }
    }

    /// pot odds against hand strength
    fn bet_score(&self, state: &GameState, action: BetAction) -> f64 {
        let seat = state.actor();
        let strength = betting::hand_strength(&seat.hand);
        let to_call = (state.current_bet - seat.current_bet).max(0) as f64;
        let pot_odds = match state.pot as f64 + to_call {
            x if x <= 0.0 => 0.0,
            x => to_call / x,
        };
        match action {
            BetAction::Check => 5.0,
            BetAction::Call => {
                if strength > pot_odds {
                    5.0 + strength
                } else {
                    1.0
                }
            }
            BetAction::Bet | BetAction::Raise => {
                if strength > 0.6 {
                    6.0 + strength
                } else {
                    strength
                }
            }
            BetAction::AllIn => {
                if strength > 0.85 {
                    7.0 + strength
                } else {
                    0.0
                }
            }
            BetAction::Fold => {
                if strength < pot_odds {
                    4.0
                } else {
                    0.5
                }
            }
        }
    }

    /// bid what the face cards suggest; nil on a toothless hand
    fn bid_score(&self, state: &GameState, value: i32, nil: bool) -> f64 {
        let seat = state.actor();
        let high_cards = seat
            .hand
            .iter()
            .filter(|c| c.rank() as u8 >= crate::cards::rank::Rank::Jack as u8)
            .count() as i32;
        if nil {
            return if high_cards == 0 { 10.0 } else { 0.0 };
        }
        8.0 - (value - high_cards).abs() as f64
    }
}
