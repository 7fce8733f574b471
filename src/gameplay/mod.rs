pub mod applier;
pub mod betting;
pub mod contracts;
pub mod generator;
pub mod handrank;
pub mod leader;
pub mod moves;
pub mod wincheck;

pub use betting::BetAction;
pub use leader::LeaderDetector;
pub use moves::Move;
