use super::seat::Seat;
use super::tension::Tension;
use crate::cards::card::Card;
use crate::cards::deck::Deck;
use crate::genome::Genome;
use crate::genome::SequenceDirection;
use crate::genome::TableauMode;
use crate::Chips;
use rand::rngs::SmallRng;

/// an outstanding claim: `claimer` has placed a card face-down on the
/// discard and announced `rank`.
#[derive(Debug, Clone, Copy)]
pub struct Claim {
    pub claimer: usize,
    pub rank: u8,
}

/// the full mutable state of one game in flight. created from a pool,
/// reset against a genome at deal time, mutated only by the applier and
/// the round drivers, and cleared on the way back to the pool.
#[derive(Debug, Clone, Default)]
pub struct GameState {
    pub seats: Vec<Seat>,
    pub deck: Deck,
    pub discard: Vec<Card>,
    pub tableau: Vec<Vec<Card>>,
    pub current_trick: Vec<(usize, Card)>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub raises: usize,
    pub betting_complete: bool,
    pub betting_done: Vec<bool>,
    pub bidding_complete: bool,
    pub team_contracts: Vec<i32>,
    pub team_bags: Vec<i32>,
    pub tableau_mode: TableauMode,
    pub sequence_direction: SequenceDirection,
    pub suit_broken: bool,
    pub current_player: usize,
    pub phase_cursor: usize,
    pub phase_progress: usize,
    pub direction: i8,
    pub turn_number: usize,
    pub winner_id: i32,
    pub winning_team: i32,
    pub hands_played: usize,
    pub claim: Option<Claim>,
    pub tension: Tension,
}

impl GameState {
    pub fn num_players(&self) -> usize {
        self.seats.len()
    }
    pub fn seat(&self, player: usize) -> &Seat {
        &self.seats[player]
    }
    pub fn actor(&self) -> &Seat {
        &self.seats[self.current_player]
    }
    pub fn top_discard(&self) -> Option<&Card> {
        self.discard.last()
    }
    pub fn is_over(&self) -> bool {
        self.winner_id >= 0
    }
    pub fn teams(&self) -> usize {
        self.team_contracts.len()
    }

    /// deal a fresh game of `genome` over this (cleared or new) state
    pub fn deal(&mut self, genome: &Genome, rng: &mut SmallRng) {
        self.clear();
        let n = genome.num_players();
        self.seats.resize_with(n, Seat::default);
        self.deck = Deck::fresh();
        self.deck.shuffle(rng);
        for _ in 0..genome.setup.cards_per_player {
            for seat in self.seats.iter_mut() {
                if let Some(card) = self.deck.draw() {
                    seat.hand.push(card);
                }
            }
        }
        self.tableau
            .resize_with(genome.setup.tableau_size, Vec::new);
        for _ in 0..genome.setup.deal_to_tableau {
            for pile in self.tableau.iter_mut() {
                if let Some(card) = self.deck.draw() {
                    pile.push(card);
                }
            }
        }
        for seat in self.seats.iter_mut() {
            seat.chips = genome.setup.starting_chips;
        }
        let teams = match genome.teams {
            Some(ref teams) => teams.len(),
            None => n,
        };
        self.team_contracts = vec![0; teams];
        self.team_bags = vec![0; teams];
        self.tableau_mode = genome.turn_structure.tableau_mode;
        self.sequence_direction = genome.turn_structure.sequence_direction;
        self.betting_done = vec![false; genome.phases().len()];
        self.direction = 1;
        self.winner_id = -1;
        self.winning_team = -1;
        self.tension.clear();
    }

    /// between-hands reset for multi-hand games: shuffle everything back,
    /// re-deal, keep scores, chips, bags, and tension history
    pub fn reset_hand(&mut self, genome: &Genome, rng: &mut SmallRng) {
        for seat in self.seats.iter_mut() {
            seat.reset_hand();
        }
        self.discard.clear();
        for pile in self.tableau.iter_mut() {
            pile.clear();
        }
        self.current_trick.clear();
        self.pot = 0;
        self.current_bet = 0;
        self.raises = 0;
        self.betting_complete = false;
        for done in self.betting_done.iter_mut() {
            *done = false;
        }
        self.bidding_complete = false;
        self.suit_broken = false;
        self.claim = None;
        self.phase_cursor = 0;
        self.phase_progress = 0;
        self.deck = Deck::fresh();
        self.deck.shuffle(rng);
        for _ in 0..genome.setup.cards_per_player {
            for seat in self.seats.iter_mut() {
                if let Some(card) = self.deck.draw() {
                    seat.hand.push(card);
                }
            }
        }
        for _ in 0..genome.setup.deal_to_tableau {
            for pile in self.tableau.iter_mut() {
                if let Some(card) = self.deck.draw() {
                    pile.push(card);
                }
            }
        }
        self.hands_played += 1;
    }

    /// wipe for return to the pool; drops no allocations it can keep
    pub fn clear(&mut self) {
        for seat in self.seats.iter_mut() {
            seat.clear();
        }
        self.seats.clear();
        self.deck.clear();
        self.discard.clear();
        self.tableau.clear();
        self.current_trick.clear();
        self.pot = 0;
        self.current_bet = 0;
        self.raises = 0;
        self.betting_complete = false;
        self.betting_done.clear();
        self.bidding_complete = false;
        self.team_contracts.clear();
        self.team_bags.clear();
        self.tableau_mode = TableauMode::None;
        self.sequence_direction = SequenceDirection::Ascending;
        self.suit_broken = false;
        self.current_player = 0;
        self.phase_cursor = 0;
        self.phase_progress = 0;
        self.direction = 1;
        self.turn_number = 0;
        self.winner_id = -1;
        self.winning_team = -1;
        self.hands_played = 0;
        self.claim = None;
        self.tension.clear();
    }

    /// the next seat clockwise (or counter, after a reverse) that is
    /// still able to take a turn
    pub fn advance_player(&mut self) {
        let n = self.num_players();
        for _ in 0..n {
            let next = (self.current_player as i64 + self.direction as i64).rem_euclid(n as i64);
            self.current_player = next as usize;
            let seat = &mut self.seats[self.current_player];
            if seat.blocked {
                seat.blocked = false;
                continue;
            }
            if seat.has_folded {
                continue;
            }
            return;
        }
    }

    /// every card currently accounted for, across all zones.
    /// conservation of this multiset is a core engine invariant.
    pub fn census(&self) -> Vec<Card> {
        let mut cards = Vec::with_capacity(crate::DECK_SIZE);
        cards.extend_from_slice(self.deck.cards());
        cards.extend_from_slice(&self.discard);
        for pile in self.tableau.iter() {
            cards.extend_from_slice(pile);
        }
        for (_, card) in self.current_trick.iter() {
            cards.push(*card);
        }
        for seat in self.seats.iter() {
            cards.extend_from_slice(&seat.hand);
            cards.extend_from_slice(&seat.captured);
        }
        cards.sort();
        cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::seeds;
    use rand::SeedableRng;

    #[test]
    fn deal_respects_setup() {
        let genome = seeds::hearts();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut state = GameState::default();
        state.deal(&genome, &mut rng);
        assert!(state.num_players() == 4);
        for seat in state.seats.iter() {
            assert!(seat.hand.len() == 13);
        }
        assert!(state.deck.is_empty());
        assert!(state.census().len() == crate::DECK_SIZE);
    }

    #[test]
    fn deal_is_seed_deterministic() {
        let genome = seeds::war();
        let mut a = GameState::default();
        let mut b = GameState::default();
        a.deal(&genome, &mut SmallRng::seed_from_u64(42));
        b.deal(&genome, &mut SmallRng::seed_from_u64(42));
        assert!(a.seats[0].hand == b.seats[0].hand);
        a.deal(&genome, &mut SmallRng::seed_from_u64(43));
        assert!(a.seats[0].hand != b.seats[0].hand);
    }

    #[test]
    fn clear_zeroes_everything() {
        let genome = seeds::betting_war();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut state = GameState::default();
        state.deal(&genome, &mut rng);
        state.pot = 40;
        state.clear();
        assert!(state.seats.is_empty());
        assert!(state.census().is_empty());
        assert!(state.pot == 0);
        assert!(state.winner_id == -1);
    }

    #[test]
    fn tableau_deal() {
        let genome = seeds::scopa();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut state = GameState::default();
        state.deal(&genome, &mut rng);
        assert!(state.tableau.len() == 4);
        for pile in state.tableau.iter() {
            assert!(pile.len() == 1);
        }
        assert!(state.census().len() == crate::DECK_SIZE);
    }
}
