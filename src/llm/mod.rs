pub mod client;
pub mod generator;
pub mod prompts;
pub mod schema;

pub use client::*;
pub use generator::*;
pub use prompts::*;
pub use schema::*;
