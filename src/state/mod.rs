pub mod pool;
pub mod seat;
pub mod table;
pub mod tension;

pub use pool::StatePool;
pub use seat::Seat;
pub use table::Claim;
pub use table::GameState;
pub use tension::Tension;
