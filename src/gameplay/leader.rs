//! the leader detector: a per-genome predicate answering "who is ahead
//! right now", feeding the tension counters after every move.

use crate::genome::Genome;
use crate::genome::WinCondition;
use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderDetector {
    /// highest score leads (also covers betting and bidding games)
    Score,
    /// lowest score leads
    LowScore,
    /// biggest captured pile leads
    Capture,
    /// smallest hand leads (shedding games)
    Shedding,
}

impl LeaderDetector {
    pub fn for_genome(genome: &Genome) -> Self {
        for condition in genome.win_conditions.iter() {
            match condition {
                WinCondition::LowScore { .. } => return LeaderDetector::LowScore,
                WinCondition::HighScore { .. }
                | WinCondition::FirstToScore { .. }
                | WinCondition::AllHandsEmpty => return LeaderDetector::Score,
                WinCondition::CaptureAll | WinCondition::MostCaptured => {
                    return LeaderDetector::Capture;
                }
                WinCondition::EmptyHand => return LeaderDetector::Shedding,
                WinCondition::BestHand => return LeaderDetector::Score,
            }
        }
        LeaderDetector::Score
    }

    fn metric(&self, state: &GameState, player: usize) -> i64 {
        let seat = &state.seats[player];
        match self {
            LeaderDetector::Score => seat.score as i64,
            LeaderDetector::LowScore => -(seat.score as i64),
            LeaderDetector::Capture => (seat.hand.len() + seat.captured.len()) as i64,
            LeaderDetector::Shedding => -(seat.hand.len() as i64),
        }
    }

    /// record the current leader and margin into the tension counters
    pub fn observe(&self, state: &mut GameState) {
        let n = state.num_players();
        if n == 0 {
            return;
        }
        let mut metrics: Vec<(i64, usize)> =
            (0..n).map(|p| (self.metric(state, p), p)).collect();
        metrics.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        let (first, leader) = metrics[0];
        let second = metrics.get(1).map(|&(m, _)| m).unwrap_or(first);
        let margin = (first - second) as f64 / (first.abs() + second.abs() + 1) as f64;
        state.tension.observe(leader as i8, margin.clamp(0.0, 1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::seeds;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn detector_picks_the_right_lens() {
        assert!(LeaderDetector::for_genome(&seeds::war()) == LeaderDetector::Capture);
        assert!(LeaderDetector::for_genome(&seeds::whist()) == LeaderDetector::Score);
        assert!(LeaderDetector::for_genome(&seeds::crazy_eights()) == LeaderDetector::Shedding);
    }

    #[test]
    fn shedding_leader_is_the_shortest_hand() {
        let genome = seeds::crazy_eights();
        let mut state = GameState::default();
        state.deal(&genome, &mut SmallRng::seed_from_u64(9));
        state.seats[1].hand.pop();
        let detector = LeaderDetector::for_genome(&genome);
        detector.observe(&mut state);
        detector.observe(&mut state);
        assert!(state.tension.lead_changes == 0);
        assert!(state.tension.turns_observed() == 2);
    }
}
