use crate::Chips;
use serde::Deserialize;
use serde::Serialize;

/// how the table is prepared before the first turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setup {
    pub num_players: usize,
    pub cards_per_player: usize,
    pub tableau_size: usize,
    pub starting_chips: Chips,
    pub deal_to_tableau: usize,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            num_players: 2,
            cards_per_player: 7,
            tableau_size: 0,
            starting_chips: 0,
            deal_to_tableau: 0,
        }
    }
}
