//! Prompt system for DocChat answer synthesis.
//!
//! This crate provides:
//! - YAML prompt definitions with built-in defaults
//! - Workspace overrides under `.docchat/prompts/`
//! - Handlebars rendering of the answer prompt and its system instruction

pub mod builder;
pub mod defaults;
pub mod loader;
pub mod types;

pub use builder::{build_answer_prompt, MAX_PROMPT_DOCUMENTS};
pub use defaults::ANSWER_PROMPT_ID;
pub use loader::{list_prompts, load_prompt};
pub use types::{
    AnswerPromptInput, BuiltPrompt, BuiltPromptMetadata, HistoryTurn, PromptDefinition,
    SystemInstruction, SystemTemplates,
};
