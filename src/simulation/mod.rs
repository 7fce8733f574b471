pub mod batch;
pub mod metrics;
pub mod runner;

pub use batch::run_batch;
pub use batch::run_batch_parallel;
pub use metrics::BatchMetrics;
pub use metrics::GameMetrics;
pub use runner::GameResult;
pub use runner::SimError;
pub use runner::run_single_game;
