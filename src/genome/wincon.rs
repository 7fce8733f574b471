use crate::Points;
use serde::Deserialize;
use serde::Serialize;

/// how a game ends. conditions are checked in declared order before each
/// turn; the first satisfied one names the winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WinCondition {
    EmptyHand,
    HighScore { threshold: Points },
    FirstToScore { threshold: Points },
    CaptureAll,
    LowScore { threshold: Points },
    AllHandsEmpty,
    BestHand,
    MostCaptured,
}

impl WinCondition {
    /// whether satisfying this condition requires score bookkeeping
    pub fn is_score_based(&self) -> bool {
        matches!(
            self,
            WinCondition::HighScore { .. }
                | WinCondition::FirstToScore { .. }
                | WinCondition::LowScore { .. }
                | WinCondition::AllHandsEmpty
        )
    }
    pub fn kind(&self) -> &'static str {
        match self {
            WinCondition::EmptyHand => "empty_hand",
            WinCondition::HighScore { .. } => "high_score",
            WinCondition::FirstToScore { .. } => "first_to_score",
            WinCondition::CaptureAll => "capture_all",
            WinCondition::LowScore { .. } => "low_score",
            WinCondition::AllHandsEmpty => "all_hands_empty",
            WinCondition::BestHand => "best_hand",
            WinCondition::MostCaptured => "most_captured",
        }
    }
}
