//! contract scoring for bidding games. teams pool their bids and their
//! tricks; teamless tables treat every seat as a team of one.

use crate::genome::BiddingPhase;
use crate::genome::Genome;
use crate::state::GameState;

/// the seat groups contracts are settled over
pub fn groups(state: &GameState, genome: &Genome) -> Vec<Vec<usize>> {
    match genome.teams {
        Some(ref teams) => teams.teams.clone(),
        None => (0..state.num_players()).map(|p| vec![p]).collect(),
    }
}

/// called when the last bid lands: freeze each group's contract
pub fn record(state: &mut GameState, genome: &Genome) {
    let groups = groups(state, genome);
    for (ti, members) in groups.iter().enumerate() {
        let contract: i32 = members
            .iter()
            .map(|&p| {
                let seat = &state.seats[p];
                match seat.is_nil_bid {
                    true => 0,
                    false => seat.current_bid.max(0),
                }
            })
            .sum();
        if let Some(slot) = state.team_contracts.get_mut(ti) {
            *slot = contract;
        }
    }
}

/// settle a finished hand against the recorded contracts
pub fn evaluate(state: &mut GameState, genome: &Genome, bp: &BiddingPhase) {
    let groups = groups(state, genome);
    for (ti, members) in groups.iter().enumerate() {
        let contract = state.team_contracts.get(ti).copied().unwrap_or(0);
        let tricks: i32 = members.iter().map(|&p| state.seats[p].tricks_won as i32).sum();
        let mut points = 0;
        let mut bags = 0;
        if tricks >= contract {
            points += bp.points_per_trick_bid * contract;
            points += bp.overtrick_points * (tricks - contract);
            bags += tricks - contract;
        } else {
            points -= bp.failed_contract_penalty * contract;
        }
        for &p in members.iter() {
            let seat = &state.seats[p];
            if seat.is_nil_bid {
                if seat.tricks_won == 0 {
                    points += bp.nil_bonus;
                } else {
                    points -= bp.nil_penalty;
                    bags += seat.tricks_won as i32;
                }
            }
        }
        if let Some(slot) = state.team_bags.get_mut(ti) {
            *slot += bags;
            if bp.bag_limit > 0 && *slot >= bp.bag_limit {
                points -= bp.bag_penalty;
                *slot %= bp.bag_limit;
            }
        }
        for &p in members.iter() {
            state.seats[p].score += points;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::seeds;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn spades_table() -> (GameState, Genome, BiddingPhase) {
        let genome = seeds::spades();
        let bp = genome.bidding().expect("spades bids").clone();
        let mut state = GameState::default();
        state.deal(&genome, &mut SmallRng::seed_from_u64(77));
        (state, genome, bp)
    }

    #[test]
    fn made_contract_scores_with_overtricks() {
        let (mut state, genome, bp) = spades_table();
        state.seats[0].current_bid = 4;
        state.seats[0].tricks_won = 6;
        for p in 1..4 {
            state.seats[p].current_bid = 1;
        }
        record(&mut state, &genome);
        evaluate(&mut state, &genome, &bp);
        // 4 bid * 10 + 2 overtricks * 1
        assert!(state.seats[0].score == 42);
        assert!(state.team_bags[0] == 2);
    }

    #[test]
    fn failed_contract_penalized() {
        let (mut state, genome, bp) = spades_table();
        state.seats[1].current_bid = 5;
        state.seats[1].tricks_won = 2;
        for p in [0usize, 2, 3] {
            state.seats[p].current_bid = 0;
        }
        record(&mut state, &genome);
        evaluate(&mut state, &genome, &bp);
        assert!(state.seats[1].score == -50);
    }

    #[test]
    fn nil_bonus_and_broken_nil() {
        let (mut state, genome, bp) = spades_table();
        for p in 0..4 {
            state.seats[p].current_bid = 0;
        }
        state.seats[2].is_nil_bid = true;
        record(&mut state, &genome);
        evaluate(&mut state, &genome, &bp);
        assert!(state.seats[2].score == bp.nil_bonus);
        state.seats[2].score = 0;
        state.seats[2].tricks_won = 1;
        evaluate(&mut state, &genome, &bp);
        assert!(state.seats[2].score == -bp.nil_penalty);
        assert!(state.team_bags[2] >= 1);
    }

    #[test]
    fn bag_limit_triggers_penalty() {
        let (mut state, genome, bp) = spades_table();
        for p in 0..4 {
            state.seats[p].current_bid = 0;
        }
        state.seats[3].current_bid = 1;
        state.seats[3].tricks_won = 1 + 9; // 9 overtricks
        record(&mut state, &genome);
        state.team_bags[3] = 5;
        evaluate(&mut state, &genome, &bp);
        // 5 + 9 = 14 bags crosses the limit of 10
        assert!(state.team_bags[3] == 4);
        assert!(state.seats[3].score == 10 + 9 - bp.bag_penalty);
    }

    #[test]
    fn partnerships_pool_tricks() {
        let genome = seeds::partnership_spades();
        let bp = genome.bidding().expect("bids").clone();
        let mut state = GameState::default();
        state.deal(&genome, &mut SmallRng::seed_from_u64(78));
        state.seats[0].current_bid = 2;
        state.seats[2].current_bid = 2;
        state.seats[0].tricks_won = 1;
        state.seats[2].tricks_won = 3;
        state.seats[1].current_bid = 0;
        state.seats[3].current_bid = 0;
        record(&mut state, &genome);
        assert!(state.team_contracts[0] == 4);
        evaluate(&mut state, &genome, &bp);
        assert!(state.seats[0].score == 40);
        assert!(state.seats[0].score == state.seats[2].score);
    }
}
