pub mod critique;
pub mod optimize;
pub mod outline;
pub mod publish;
pub mod research;
pub mod write;

pub use critique::*;
pub use optimize::*;
pub use outline::*;
pub use publish::*;
pub use research::*;
pub use write::*;
