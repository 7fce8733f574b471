use super::table::GameState;

/// a free-list of game states. each worker owns one, so there is no
/// locking; releasing clears the state so the next acquire starts from
/// zeroed contents with warm allocations.
#[derive(Debug, Default)]
pub struct StatePool {
    free: Vec<Box<GameState>>,
}

impl StatePool {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn acquire(&mut self) -> Box<GameState> {
        self.free.pop().unwrap_or_default()
    }
    pub fn release(&mut self, mut state: Box<GameState>) {
        state.clear();
        self.free.push(state);
    }
    pub fn idle(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::seeds;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn recycled_states_come_back_zeroed() {
        let mut pool = StatePool::new();
        let mut state = pool.acquire();
        state.deal(&seeds::war(), &mut SmallRng::seed_from_u64(3));
        state.pot = 99;
        pool.release(state);
        assert!(pool.idle() == 1);
        let state = pool.acquire();
        assert!(state.pot == 0);
        assert!(state.seats.is_empty());
        assert!(pool.idle() == 0);
    }
}
