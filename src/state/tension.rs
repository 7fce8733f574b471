/// drama bookkeeping, updated once per applied move by the leader
/// detector. feeds the tension-curve and comeback subscores.
#[derive(Debug, Clone, Default)]
pub struct Tension {
    pub lead_changes: usize,
    pub decisive_turns: usize,
    pub closest_margin: f64,
    pub winner_was_trailing: bool,
    leaders: Vec<i8>,
    last_margin: f64,
}

impl Tension {
    pub fn clear(&mut self) {
        self.lead_changes = 0;
        self.decisive_turns = 0;
        self.closest_margin = 1.0;
        self.winner_was_trailing = false;
        self.leaders.clear();
        self.last_margin = 1.0;
    }

    /// record this turn's leader and the normalized gap to the runner-up
    pub fn observe(&mut self, leader: i8, margin: f64) {
        if let Some(&last) = self.leaders.last() {
            if last != leader {
                self.lead_changes += 1;
            }
            if (margin - self.last_margin).abs() > f64::EPSILON {
                self.decisive_turns += 1;
            }
        }
        if margin < self.closest_margin {
            self.closest_margin = margin;
        }
        self.leaders.push(leader);
        self.last_margin = margin;
    }

    /// called once at game end to settle the comeback flag
    pub fn finish(&mut self, winner: i32) {
        if winner < 0 || self.leaders.is_empty() {
            return;
        }
        let mid = self.leaders[self.leaders.len() / 2];
        self.winner_was_trailing = mid >= 0 && mid as i32 != winner;
    }

    pub fn turns_observed(&self) -> usize {
        self.leaders.len()
    }
}
