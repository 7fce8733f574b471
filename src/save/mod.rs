pub mod checkpoint;
pub mod writer;

pub use checkpoint::Checkpoint;
pub use checkpoint::CHECKPOINT_VERSION;
