use crate::gameplay::moves::Move;
use crate::genome::Genome;
use crate::state::GameState;
use rand::rngs::SmallRng;

/// an agent: given the visible state and the legal moves, pick one.
/// policies are mutable so tree searchers can keep scratch space.
pub trait Policy {
    fn choose(
        &mut self,
        state: &GameState,
        genome: &Genome,
        moves: &[Move],
        rng: &mut SmallRng,
    ) -> Move;
    fn name(&self) -> &'static str;
}

/// the policies seated at the table. one shared policy drives every
/// seat, or one policy per seat for asymmetric matchups.
pub struct Agents {
    policies: Vec<Box<dyn Policy>>,
}

impl Agents {
    pub fn shared(policy: Box<dyn Policy>) -> Self {
        Self {
            policies: vec![policy],
        }
    }
    pub fn seated(policies: Vec<Box<dyn Policy>>) -> Self {
        assert!(!policies.is_empty());
        Self { policies }
    }
    pub fn for_player(&mut self, player: usize) -> &mut dyn Policy {
        let index = match self.policies.len() {
            1 => 0,
            n => player % n,
        };
        self.policies[index].as_mut()
    }
}

/// agent selection as it appears in configuration and skill evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Random,
    Greedy,
    Mcts(usize),
}

impl AgentKind {
    pub fn build(&self) -> Box<dyn Policy> {
        match self {
            AgentKind::Random => Box::new(super::random::RandomPolicy),
            AgentKind::Greedy => Box::new(super::greedy::GreedyPolicy),
            AgentKind::Mcts(iterations) => Box::new(super::mcts::MctsPolicy::new(*iterations)),
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AgentKind::Random => write!(f, "random"),
            AgentKind::Greedy => write!(f, "greedy"),
            AgentKind::Mcts(n) => write!(f, "mcts@{}", n),
        }
    }
}
