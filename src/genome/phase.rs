use super::condition::Condition;
use crate::cards::location::Location;
use crate::Chips;
use crate::Points;
use serde::Deserialize;
use serde::Serialize;

/// one ordered step within a turn. each variant carries everything the
/// move generator and applier need to interpret that step, so dispatch
/// is a plain match on the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Phase {
    Draw(DrawPhase),
    Play(PlayPhase),
    Discard(DiscardPhase),
    Trick(TrickPhase),
    Betting(BettingPhase),
    Claim(ClaimPhase),
    Bidding(BiddingPhase),
}

impl Phase {
    /// whether this phase moves cards, as opposed to chips or contracts
    pub fn plays_cards(&self) -> bool {
        matches!(
            self,
            Phase::Draw(_) | Phase::Play(_) | Phase::Discard(_) | Phase::Trick(_)
        )
    }
    pub fn kind(&self) -> &'static str {
        match self {
            Phase::Draw(_) => "draw",
            Phase::Play(_) => "play",
            Phase::Discard(_) => "discard",
            Phase::Trick(_) => "trick",
            Phase::Betting(_) => "betting",
            Phase::Claim(_) => "claim",
            Phase::Bidding(_) => "bidding",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawPhase {
    pub source: Location,
    pub count: usize,
    pub mandatory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayPhase {
    pub target: Location,
    pub min_cards: usize,
    pub max_cards: usize,
    pub mandatory: bool,
    pub pass_if_unable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_play_condition: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscardPhase {
    pub target: Location,
    pub count: usize,
    pub mandatory: bool,
}

/// trump_suit and breaking_suit use the wildcard sentinel for "none"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrickPhase {
    pub lead_suit_required: bool,
    pub trump_suit: u8,
    pub high_card_wins: bool,
    pub breaking_suit: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingPhase {
    pub min_bet: Chips,
    pub max_raises: usize,
}

/// claims are driven entirely by state; the phase carries no parameters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClaimPhase {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiddingPhase {
    pub min_bid: i32,
    pub max_bid: i32,
    pub allow_nil: bool,
    pub points_per_trick_bid: Points,
    pub overtrick_points: Points,
    pub failed_contract_penalty: Points,
    pub nil_bonus: Points,
    pub nil_penalty: Points,
    pub bag_limit: i32,
    pub bag_penalty: Points,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.kind())
    }
}
