/// where a card lives, or where a move routes one.
/// doubles as the reference location of rule conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Deck,
    Hand,
    Discard,
    Tableau,
    OpponentHand,
    Captured,
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(
            f,
            "{}",
            match self {
                Location::Deck => "deck",
                Location::Hand => "hand",
                Location::Discard => "discard",
                Location::Tableau => "tableau",
                Location::OpponentHand => "opponent_hand",
                Location::Captured => "captured",
            }
        )
    }
}

use serde::Deserialize;
use serde::Serialize;
use std::fmt::{Display, Formatter, Result};
