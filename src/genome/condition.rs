use crate::cards::location::Location;
use serde::Deserialize;
use serde::Serialize;

/// what a condition inspects before comparing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    HandSize,
    LocSize,
    CardRank,
    CardSuit,
    MatchRank,
    MatchSuit,
    BeatsTop,
    Sequence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    EQ,
    NE,
    LT,
    LE,
    GT,
    GE,
}

impl Comparator {
    pub fn compare(&self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comparator::EQ => lhs == rhs,
            Comparator::NE => lhs != rhs,
            Comparator::LT => lhs < rhs,
            Comparator::LE => lhs <= rhs,
            Comparator::GT => lhs > rhs,
            Comparator::GE => lhs >= rhs,
        }
    }
}

/// a minimal predicate over game state. the evaluator lives with the
/// move generator, which owns the state it inspects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub op: Predicate,
    pub cmp: Comparator,
    pub value: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Location>,
}
