use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    SkipNext,
    Reverse,
    DrawTwo,
    DrawFour,
    Wild,
    SwapHands,
    BlockNext,
    StealCard,
    PeekHand,
    DiscardPile,
}

/// which seat an effect lands on, relative to the player who triggered it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSelect {
    Actor,
    NextPlayer,
    PreviousPlayer,
    AllOpponents,
    RandomOpponent,
}

/// a special card effect keyed on the rank that triggers it.
/// `value` is effect-specific (e.g. cards to draw for Draw effects).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectRule {
    pub trigger_rank: u8,
    pub effect: EffectKind,
    pub target: TargetSelect,
    pub value: i32,
}
