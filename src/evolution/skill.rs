//! skill evaluation: does playing better actually win more? a genome is
//! probed by seating a smart policy against random opposition in both
//! seat orders, which also exposes any first-mover advantage.

use crate::genome::Genome;
use crate::players::policy::Agents;
use crate::players::AgentKind;
use crate::simulation::batch;
use crate::simulation::runner;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillConfig {
    /// run the probe every this many generations (0 disables it)
    pub frequency: usize,
    /// games per seating arrangement
    pub games: usize,
    /// MCTS budget for the strong seat
    pub mcts_iterations: usize,
    /// share of the population (by fitness) that gets probed
    pub top_fraction: f64,
    pub fpa_threshold: f64,
    pub fpa_weight: f64,
    pub low_skill_threshold: f64,
    pub low_skill_weight: f64,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            frequency: 5,
            games: 20,
            mcts_iterations: 500,
            top_fraction: 0.2,
            fpa_threshold: 0.2,
            fpa_weight: 0.3,
            low_skill_threshold: 0.55,
            low_skill_weight: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SkillReport {
    pub greedy_win_rate: f64,
    pub mcts_win_rate: f64,
    pub skill_score: f64,
    pub first_player_advantage: f64,
}

/// run the full probe: greedy-vs-random and mcts-vs-random, each in
/// both seat orders
pub fn evaluate_skill(
    genome: &Genome,
    games: usize,
    mcts_iterations: usize,
    seed: u64,
) -> SkillReport {
    let (greedy_win_rate, greedy_fpa) = matchup(genome, AgentKind::Greedy, games, seed);
    let (mcts_win_rate, mcts_fpa) = matchup(
        genome,
        AgentKind::Mcts(mcts_iterations),
        games,
        seed.wrapping_add(1),
    );
    SkillReport {
        greedy_win_rate,
        mcts_win_rate,
        skill_score: (greedy_win_rate + mcts_win_rate) / 2.0,
        first_player_advantage: (greedy_fpa + mcts_fpa) / 2.0,
    }
}

/// returns (strong agent's aggregate win rate, seat-zero advantage)
fn matchup(genome: &Genome, strong: AgentKind, games: usize, seed: u64) -> (f64, f64) {
    let mut strong_wins = 0usize;
    let mut seat_zero_wins = 0usize;
    let mut seat_one_wins = 0usize;
    let mut total = 0usize;
    for (direction, batch_seed) in [(0usize, seed), (1usize, seed.wrapping_add(0x9e37))] {
        for game_seed in batch::game_seeds(batch_seed, games) {
            let mut agents = match direction {
                0 => Agents::seated(vec![strong.build(), AgentKind::Random.build()]),
                _ => Agents::seated(vec![AgentKind::Random.build(), strong.build()]),
            };
            let result = runner::run_single_game(genome, &mut agents, game_seed);
            total += 1;
            match result.winner {
                0 => seat_zero_wins += 1,
                1 => seat_one_wins += 1,
                _ => (),
            }
            let strong_seat_won = match direction {
                0 => result.winner == 0 || (result.winner > 1 && result.winner % 2 == 0),
                _ => result.winner >= 1 && result.winner % 2 == 1,
            };
            if strong_seat_won {
                strong_wins += 1;
            }
        }
    }
    match total {
        0 => (0.0, 0.0),
        t => (
            strong_wins as f64 / t as f64,
            (seat_zero_wins as f64 - seat_one_wins as f64) / t as f64,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::seeds;

    #[test]
    fn war_has_no_skill() {
        // every war turn is forced, so search buys nothing and the
        // matchup hugs a coin flip (draws drag both rates below half)
        let report = evaluate_skill(&seeds::war(), 20, 500, 42);
        assert!(report.greedy_win_rate >= 0.35 && report.greedy_win_rate <= 0.65);
        assert!(report.mcts_win_rate >= 0.35 && report.mcts_win_rate <= 0.65);
        assert!(report.skill_score <= 0.65);
        assert!(report.first_player_advantage.abs() <= 0.30);
    }

    #[test]
    fn report_averages_its_parts() {
        let report = evaluate_skill(&seeds::crazy_eights(), 6, 50, 7);
        let mean = (report.greedy_win_rate + report.mcts_win_rate) / 2.0;
        assert!((report.skill_score - mean).abs() < 1e-12);
    }
}
