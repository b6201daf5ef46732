pub mod config;
pub mod error;
pub mod io;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod publish;
pub mod rag;
pub mod stages;
pub mod testing;

pub use config::Settings;
pub use error::{ConfigError, StageError};
pub use io::{RunRecordWriter, WrittenRecord, load_topic_file};
pub use llm::{AnthropicClient, AnthropicConfig, Generator};
pub use models::{RunState, Stage, Topic, Visibility};
pub use pipeline::{Collaborators, Pipeline, RevisionGate};
pub use publish::{
    Approver, AutoApprover, ConsoleApprover, DryRunPublisher, Publisher, TistoryPublisher,
};
pub use rag::{KnowledgeBase, Retriever};
