pub mod crossover;
pub mod diversity;
pub mod engine;
pub mod operators;
pub mod skill;

pub use engine::EvolutionConfig;
pub use engine::EvolutionEngine;
pub use engine::GenStats;
pub use engine::Individual;
pub use operators::Registry;
pub use skill::SkillConfig;
pub use skill::SkillReport;
