pub mod content;
pub mod outline;
pub mod publish;
pub mod research;
pub mod review;
pub mod state;
pub mod topic;

pub use content::*;
pub use outline::*;
pub use publish::*;
pub use research::*;
pub use review::*;
pub use state::*;
pub use topic::*;
