use super::phase::Phase;
use super::rules::Genome;
use super::rules::TableauMode;
use super::wincon::WinCondition;
use crate::DECK_SIZE;
use serde::Deserialize;
use serde::Serialize;

/// one failed invariant. validation reports, it never panics: an invalid
/// genome may still be simulated, and the fitness stage punishes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl Genome {
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// check every structural invariant, collecting all failures
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.validate_setup(&mut violations);
        self.validate_turns(&mut violations);
        self.validate_wins(&mut violations);
        self.validate_betting(&mut violations);
        self.validate_patterns(&mut violations);
        self.validate_teams(&mut violations);
        violations
    }

    fn validate_setup(&self, out: &mut Vec<Violation>) {
        let s = &self.setup;
        if !(crate::MIN_PLAYERS..=crate::MAX_PLAYERS).contains(&s.num_players) {
            out.push(Violation::new(
                "setup.num_players",
                format!(
                    "{} players is outside the supported {}..{} table",
                    s.num_players,
                    crate::MIN_PLAYERS,
                    crate::MAX_PLAYERS
                ),
            ));
        }
        if s.cards_per_player < 1 {
            out.push(Violation::new(
                "setup.cards_per_player",
                "each player must be dealt at least one card",
            ));
        }
        let dealt = s.num_players * s.cards_per_player + s.deal_to_tableau * s.tableau_size;
        if dealt > DECK_SIZE {
            out.push(Violation::new(
                "setup",
                format!("initial deal needs {} cards but the deck holds {}", dealt, DECK_SIZE),
            ));
        }
    }

    fn validate_turns(&self, out: &mut Vec<Violation>) {
        if self.phases().is_empty() {
            out.push(Violation::new(
                "turn_structure.phases",
                "turn structure must contain at least one phase",
            ));
        }
        if self.card_play_phases() == 0 {
            out.push(Violation::new(
                "turn_structure.phases",
                "at least one draw, play, discard, or trick phase is required",
            ));
        }
        if self.has_bidding() && !self.has_trick() {
            out.push(Violation::new(
                "turn_structure.phases",
                "bidding requires at least one trick phase to bid over",
            ));
        }
    }

    fn validate_wins(&self, out: &mut Vec<Violation>) {
        if self.win_conditions.is_empty() {
            out.push(Violation::new(
                "win_conditions",
                "at least one win condition is required",
            ));
        }
        // contract scoring and pot awards also feed scores, so bidding and
        // betting games may run score-based wins without per-card rules
        let scores_flow = !self.card_scoring.is_empty() || self.has_bidding() || self.has_betting();
        if self.is_score_based() && !scores_flow {
            out.push(Violation::new(
                "card_scoring",
                "score-based win conditions require at least one scoring rule",
            ));
        }
        let best_hand = self
            .win_conditions
            .iter()
            .any(|w| matches!(w, WinCondition::BestHand));
        let pattern_eval = matches!(
            self.hand_eval,
            Some(super::handeval::HandEval::PatternMatch { .. })
        );
        if best_hand && !pattern_eval {
            out.push(Violation::new(
                "hand_eval",
                "a best-hand win condition requires pattern-match hand evaluation",
            ));
        }
        let capture_win = self.win_conditions.iter().any(|w| {
            matches!(w, WinCondition::CaptureAll | WinCondition::MostCaptured)
        });
        let capture_mode = matches!(
            self.turn_structure.tableau_mode,
            TableauMode::War | TableauMode::MatchRank
        );
        if capture_win && !capture_mode {
            out.push(Violation::new(
                "turn_structure.tableau_mode",
                "capture win conditions require a war or match-rank tableau",
            ));
        }
    }

    fn validate_betting(&self, out: &mut Vec<Violation>) {
        let chips = self.setup.starting_chips;
        if self.has_betting() {
            if chips <= 0 {
                out.push(Violation::new(
                    "setup.starting_chips",
                    "betting phases require a positive chip stack",
                ));
            }
            for (i, phase) in self.phases().iter().enumerate() {
                if let Phase::Betting(b) = phase {
                    if chips > 0 && b.min_bet > chips / 2 {
                        out.push(Violation::new(
                            &format!("turn_structure.phases[{}].min_bet", i),
                            "minimum bet may not exceed half the starting stack",
                        ));
                    }
                }
            }
        } else if chips > 0 {
            out.push(Violation::new(
                "setup.starting_chips",
                "chips are dealt but no betting phase spends them",
            ));
        }
    }

    fn validate_patterns(&self, out: &mut Vec<Violation>) {
        if let Some(super::handeval::HandEval::PatternMatch { ref patterns }) = self.hand_eval {
            for (i, pattern) in patterns.iter().enumerate() {
                let grouped: usize = pattern.same_rank_groups.iter().sum();
                if grouped > pattern.required_count {
                    out.push(Violation::new(
                        &format!("hand_eval.patterns[{}]", i),
                        format!(
                            "rank groups need {} cards but the pattern only takes {}",
                            grouped, pattern.required_count
                        ),
                    ));
                }
            }
        }
    }

    fn validate_teams(&self, out: &mut Vec<Violation>) {
        let Some(ref teams) = self.teams else {
            return;
        };
        let n = self.setup.num_players;
        if teams.len() < 2 {
            out.push(Violation::new("teams", "team play needs at least two teams"));
        }
        if teams.teams.iter().any(|t| t.is_empty()) {
            out.push(Violation::new("teams", "every team needs at least one seat"));
        }
        let mut seen = vec![0usize; n];
        for team in teams.teams.iter() {
            for &seat in team.iter() {
                match seen.get_mut(seat) {
                    Some(count) => *count += 1,
                    None => out.push(Violation::new(
                        "teams",
                        format!("seat {} does not exist at a {}-player table", seat, n),
                    )),
                }
            }
        }
        if seen.iter().any(|&c| c > 1) {
            out.push(Violation::new("teams", "a seat may not sit on two teams"));
        }
        if seen.iter().any(|&c| c == 0) {
            out.push(Violation::new("teams", "every seat must be on some team"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::seeds;
    use super::*;
    use crate::genome::teams::Teams;

    #[test]
    fn seed_genomes_are_valid() {
        for genome in seeds::all() {
            let violations = genome.validate();
            assert!(
                violations.is_empty(),
                "{}: {:?}",
                genome.name,
                violations
            );
        }
    }

    #[test]
    fn deck_capacity() {
        let mut g = seeds::war();
        g.setup.cards_per_player = 30;
        assert!(g.validate().iter().any(|v| v.field == "setup"));
    }

    #[test]
    fn score_wins_need_scoring() {
        let mut g = seeds::hearts();
        g.card_scoring.clear();
        assert!(g.validate().iter().any(|v| v.field == "card_scoring"));
    }

    #[test]
    fn betting_needs_chips() {
        let mut g = seeds::simple_poker();
        g.setup.starting_chips = 0;
        assert!(g
            .validate()
            .iter()
            .any(|v| v.field == "setup.starting_chips"));
    }

    #[test]
    fn min_bet_bounded_by_stack() {
        let mut g = seeds::simple_poker();
        g.setup.starting_chips = 10;
        for phase in g.turn_structure.phases.iter_mut() {
            if let Phase::Betting(b) = phase {
                b.min_bet = 6;
            }
        }
        assert!(g.validate().iter().any(|v| v.field.ends_with("min_bet")));
    }

    #[test]
    fn capture_wins_need_capture_tableau() {
        let mut g = seeds::war();
        g.turn_structure.tableau_mode = TableauMode::Sequence;
        assert!(g
            .validate()
            .iter()
            .any(|v| v.field == "turn_structure.tableau_mode"));
    }

    #[test]
    fn bidding_needs_tricks() {
        let mut g = seeds::spades();
        g.turn_structure.phases.retain(|p| !matches!(p, Phase::Trick(_)));
        assert!(!g.validate().is_empty());
    }

    #[test]
    fn teams_must_partition() {
        let mut g = seeds::partnership_spades();
        g.teams = Some(Teams {
            teams: vec![vec![0, 1], vec![1, 2]],
        });
        assert!(g.validate().iter().any(|v| v.field == "teams"));
        g.teams = Some(Teams {
            teams: vec![vec![0, 1, 2, 3]],
        });
        assert!(g.validate().iter().any(|v| v.field == "teams"));
    }

    #[test]
    fn rank_groups_bounded() {
        let mut g = seeds::simple_poker();
        if let Some(crate::genome::handeval::HandEval::PatternMatch { ref mut patterns }) =
            g.hand_eval
        {
            patterns[0].required_count = 2;
            patterns[0].same_rank_groups = vec![2, 2];
        }
        assert!(g.validate().iter().any(|v| v.field.starts_with("hand_eval")));
    }

    #[test]
    fn phaseless_genome_reports() {
        let mut g = seeds::war();
        g.turn_structure.phases.clear();
        let violations = g.validate();
        assert!(violations.len() >= 2); // empty and no card-play phase
    }
}
