pub mod condition;
pub mod effect;
pub mod handeval;
pub mod json;
pub mod phase;
pub mod rules;
pub mod scoring;
pub mod seeds;
pub mod setup;
pub mod teams;
pub mod validate;
pub mod wincon;

pub use condition::Comparator;
pub use condition::Condition;
pub use condition::Predicate;
pub use effect::EffectKind;
pub use effect::EffectRule;
pub use effect::TargetSelect;
pub use handeval::CardValue;
pub use handeval::HandEval;
pub use handeval::HandPattern;
pub use phase::BettingPhase;
pub use phase::BiddingPhase;
pub use phase::ClaimPhase;
pub use phase::DiscardPhase;
pub use phase::DrawPhase;
pub use phase::Phase;
pub use phase::PlayPhase;
pub use phase::TrickPhase;
pub use rules::Genome;
pub use rules::SequenceDirection;
pub use rules::TableauMode;
pub use rules::TurnStructure;
pub use scoring::ScoreTrigger;
pub use scoring::ScoringRule;
pub use setup::Setup;
pub use teams::Teams;
pub use validate::Violation;
pub use wincon::WinCondition;
