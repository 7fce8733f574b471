use crate::Points;
use serde::Deserialize;
use serde::Serialize;

/// per-rank value for point-total evaluation. `alt_value` substitutes for
/// `value` when counting the primary would bust the hand (the ace rule).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardValue {
    pub value: Points,
    pub alt_value: Points,
}

/// one recognizable shape of hand, e.g. "flush" or "run of three".
/// patterns are kept in priority order; the first match wins and
/// tie-breaks fall through to high-card comparison of the cards that
/// satisfied the pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandPattern {
    pub name: String,
    pub required_count: usize,
    #[serde(default)]
    pub same_suit_count: usize,
    #[serde(default)]
    pub sequence_length: usize,
    #[serde(default)]
    pub allow_wrap: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub same_rank_groups: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_ranks: Vec<u8>,
}

/// how showdowns rank hands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HandEval {
    HighCard,
    PointTotal {
        card_values: Vec<CardValue>,
        target_value: Points,
        bust_threshold: Points,
    },
    PatternMatch {
        patterns: Vec<HandPattern>,
    },
}

impl HandEval {
    /// the blackjack-style table: 2..10 at face value, courts at 10,
    /// ace at 11 falling back to 1
    pub fn standard_point_values() -> Vec<CardValue> {
        (0..13)
            .map(|r| match r {
                12 => CardValue {
                    value: 11,
                    alt_value: 1,
                },
                8..=11 => CardValue {
                    value: 10,
                    alt_value: 10,
                },
                n => CardValue {
                    value: n as Points + 2,
                    alt_value: n as Points + 2,
                },
            })
            .collect()
    }
}
