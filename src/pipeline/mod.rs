pub mod gate;
pub mod orchestrator;

pub use gate::*;
pub use orchestrator::*;
