//! win condition evaluation, run before move generation each turn.
//! conditions are checked in declared order; the first satisfied one
//! names the winner.

use crate::genome::Genome;
use crate::genome::WinCondition;
use crate::state::GameState;

pub fn check_win(state: &GameState, genome: &Genome) -> Option<usize> {
    for condition in genome.win_conditions.iter() {
        let winner = match condition {
            WinCondition::EmptyHand => empty_hand(state),
            WinCondition::CaptureAll => capture_all(state),
            WinCondition::AllHandsEmpty => all_hands_empty(state),
            WinCondition::HighScore { threshold } => score_at_least(state, *threshold),
            WinCondition::FirstToScore { threshold } => score_at_least(state, *threshold),
            WinCondition::LowScore { threshold } => low_score(state, *threshold),
            WinCondition::MostCaptured => most_captured(state),
            // showdowns settle this one inside the betting driver
            WinCondition::BestHand => None,
        };
        if winner.is_some() {
            return winner;
        }
    }
    None
}

/// stamp the winner (and their team, when teams exist) onto the state
pub fn declare(state: &mut GameState, genome: &Genome, winner: usize) {
    state.winner_id = winner as i32;
    state.winning_team = match genome.teams {
        Some(ref teams) => teams.team_of(winner).map(|t| t as i32).unwrap_or(-1),
        None => -1,
    };
}

fn empty_hand(state: &GameState) -> Option<usize> {
    let someone_holds = state.seats.iter().any(|s| !s.hand.is_empty());
    if !someone_holds {
        return None;
    }
    state.seats.iter().position(|s| s.hand.is_empty())
}

/// one player holds everything while every other hand is bare
fn capture_all(state: &GameState) -> Option<usize> {
    let holders: Vec<usize> = (0..state.num_players())
        .filter(|&p| !state.seats[p].hand.is_empty() || !state.seats[p].captured.is_empty())
        .collect();
    match holders.as_slice() {
        [lone] => Some(*lone),
        _ => None,
    }
}

/// once every hand is out of cards the table settles on score
fn all_hands_empty(state: &GameState) -> Option<usize> {
    if state.seats.iter().any(|s| !s.hand.is_empty()) {
        return None;
    }
    best_score(state)
}

fn best_score(state: &GameState) -> Option<usize> {
    (0..state.num_players()).max_by_key(|&p| (state.seats[p].score, std::cmp::Reverse(p)))
}

fn score_at_least(state: &GameState, threshold: crate::Points) -> Option<usize> {
    (0..state.num_players()).find(|&p| state.seats[p].score >= threshold)
}

/// once anyone crosses the threshold, the cleanest sheet wins
fn low_score(state: &GameState, threshold: crate::Points) -> Option<usize> {
    let triggered = state.seats.iter().any(|s| s.score >= threshold);
    if !triggered {
        return None;
    }
    (0..state.num_players()).min_by_key(|&p| (state.seats[p].score, p))
}

fn most_captured(state: &GameState) -> Option<usize> {
    let exhausted =
        state.seats.iter().all(|s| s.hand.is_empty()) && state.deck.is_empty();
    if !exhausted {
        return None;
    }
    (0..state.num_players())
        .max_by_key(|&p| (state.seats[p].captured.len(), std::cmp::Reverse(p)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::seeds;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn table(genome: &Genome, seed: u64) -> GameState {
        let mut state = GameState::default();
        state.deal(genome, &mut SmallRng::seed_from_u64(seed));
        state
    }

    #[test]
    fn empty_hand_needs_a_holder_left() {
        let genome = seeds::crazy_eights();
        let mut state = table(&genome, 1);
        assert!(check_win(&state, &genome).is_none());
        state.seats[1].hand.clear();
        assert!(check_win(&state, &genome) == Some(1));
        state.seats[0].hand.clear();
        // nobody holds anything: not an empty-hand win
        assert!(check_win(&state, &genome).is_none());
    }

    #[test]
    fn capture_all_waits_for_total_collapse() {
        let genome = seeds::war();
        let mut state = table(&genome, 2);
        assert!(check_win(&state, &genome).is_none());
        let taken: Vec<_> = state.seats[1].hand.drain(..).collect();
        state.seats[0].captured.extend(taken);
        assert!(check_win(&state, &genome) == Some(0));
    }

    #[test]
    fn first_to_score_prefers_seat_order() {
        let genome = seeds::whist();
        let mut state = table(&genome, 3);
        state.seats[2].score = 7;
        state.seats[3].score = 9;
        assert!(check_win(&state, &genome) == Some(2));
    }

    #[test]
    fn low_score_rewards_the_cleanest_sheet() {
        let mut genome = seeds::hearts();
        genome.win_conditions = vec![crate::genome::WinCondition::LowScore { threshold: 10 }];
        let mut state = table(&genome, 4);
        state.seats[0].score = 12;
        state.seats[1].score = 3;
        state.seats[2].score = 5;
        assert!(check_win(&state, &genome) == Some(1));
        state.seats[0].score = 9;
        // nobody at threshold yet
        assert!(check_win(&state, &genome).is_none());
    }

    #[test]
    fn declare_sets_both_winner_fields() {
        let genome = seeds::partnership_spades();
        let mut state = table(&genome, 5);
        declare(&mut state, &genome, 3);
        assert!(state.winner_id == 3);
        assert!(state.winning_team == 1);
        let solo = seeds::war();
        let mut state = table(&solo, 5);
        declare(&mut state, &solo, 1);
        assert!(state.winner_id == 1);
        assert!(state.winning_team == -1);
    }

    #[test]
    fn most_captured_needs_exhaustion() {
        let genome = seeds::scopa();
        let mut state = table(&genome, 6);
        assert!(check_win(&state, &genome).is_none());
        for p in 0..2 {
            let hand: Vec<_> = state.seats[p].hand.drain(..).collect();
            state.seats[p].captured.extend(hand);
        }
        while let Some(card) = state.deck.draw() {
            state.seats[0].captured.push(card);
        }
        assert!(check_win(&state, &genome) == Some(0));
    }
}
