//! Command handlers for the DocChat CLI.

pub mod ask;
pub mod chat;
pub mod chunk;
pub mod reindex;
pub mod status;

mod service;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use chunk::ChunkCommand;
pub use reindex::ReindexCommand;
pub use status::StatusCommand;
