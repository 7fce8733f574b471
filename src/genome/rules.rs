use super::effect::EffectRule;
use super::handeval::HandEval;
use super::phase::Phase;
use super::scoring::ScoringRule;
use super::setup::Setup;
use super::teams::Teams;
use super::wincon::WinCondition;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableauMode {
    #[default]
    None,
    War,
    MatchRank,
    Sequence,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceDirection {
    #[default]
    Ascending,
    Descending,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnStructure {
    pub phases: Vec<Phase>,
    pub max_turns: usize,
    pub tableau_mode: TableauMode,
    pub sequence_direction: SequenceDirection,
    pub is_trick_based: bool,
}

/// the complete rule set of one candidate game. immutable by convention:
/// every genetic operator deep-clones before touching anything, so a
/// genome shared across worker threads is never written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub name: String,
    pub generation: u32,
    pub setup: Setup,
    pub turn_structure: TurnStructure,
    pub win_conditions: Vec<WinCondition>,
    #[serde(default)]
    pub effects: Vec<EffectRule>,
    #[serde(default)]
    pub card_scoring: Vec<ScoringRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand_eval: Option<HandEval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<Teams>,
}

impl Genome {
    pub fn num_players(&self) -> usize {
        self.setup.num_players
    }
    pub fn phases(&self) -> &[Phase] {
        &self.turn_structure.phases
    }
    pub fn has_betting(&self) -> bool {
        self.phases().iter().any(|p| matches!(p, Phase::Betting(_)))
    }
    pub fn has_bidding(&self) -> bool {
        self.phases().iter().any(|p| matches!(p, Phase::Bidding(_)))
    }
    pub fn has_trick(&self) -> bool {
        self.phases().iter().any(|p| matches!(p, Phase::Trick(_)))
    }
    pub fn has_claim(&self) -> bool {
        self.phases().iter().any(|p| matches!(p, Phase::Claim(_)))
    }
    pub fn card_play_phases(&self) -> usize {
        self.phases().iter().filter(|p| p.plays_cards()).count()
    }
    /// any win condition that settles by accumulated score
    pub fn is_score_based(&self) -> bool {
        self.win_conditions.iter().any(|w| w.is_score_based())
    }
    /// the first bidding phase's contract parameters, if any
    pub fn bidding(&self) -> Option<&super::phase::BiddingPhase> {
        self.phases().iter().find_map(|p| match p {
            Phase::Bidding(b) => Some(b),
            _ => None,
        })
    }
    /// the first trick phase's parameters, if any
    pub fn trick(&self) -> Option<&super::phase::TrickPhase> {
        self.phases().iter().find_map(|p| match p {
            Phase::Trick(t) => Some(t),
            _ => None,
        })
    }
}

impl std::fmt::Display for Genome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} g{} ({}p, {} phases)",
            self.name,
            self.generation,
            self.setup.num_players,
            self.phases().len()
        )
    }
}
