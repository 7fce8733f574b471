use serde::Deserialize;
use serde::Serialize;

/// a partition of seat indices into fixed partnerships.
/// validity (disjoint, covering, non-empty) is checked by the validator,
/// not enforced structurally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teams {
    pub teams: Vec<Vec<usize>>,
}

impl Teams {
    /// which team a seat belongs to, if any
    pub fn team_of(&self, player: usize) -> Option<usize> {
        self.teams.iter().position(|t| t.contains(&player))
    }
    pub fn len(&self) -> usize {
        self.teams.len()
    }
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}
