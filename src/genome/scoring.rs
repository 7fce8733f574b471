use crate::Points;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTrigger {
    TrickWin,
    Capture,
    Play,
    HandEnd,
    SetComplete,
}

/// points awarded when a matching card participates in the triggering
/// event. suit and rank may be wildcarded with the sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub suit: u8,
    pub rank: u8,
    pub points: Points,
    pub trigger: ScoreTrigger,
}

impl ScoringRule {
    pub fn matches(&self, card: &crate::cards::card::Card) -> bool {
        card.matches_rank(self.rank) && card.matches_suit(self.suit)
    }
}
