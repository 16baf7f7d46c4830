//! Answer prompt builder.
//!
//! Renders the Role → Rules → Data → Task user message and selects the
//! system instruction that accompanies it.

use crate::types::{AnswerPromptInput, BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
use docchat_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;

/// Only the best-ranked chunks make it into the prompt.
pub const MAX_PROMPT_DOCUMENTS: usize = 5;

#[derive(Serialize)]
struct DocumentView<'a> {
    position: usize,
    text: &'a str,
}

#[derive(Serialize)]
struct TurnView<'a> {
    question: &'a str,
    answer: &'a str,
}

#[derive(Serialize)]
struct AnswerView<'a> {
    question: &'a str,
    documents: Vec<DocumentView<'a>>,
    history: Vec<TurnView<'a>>,
    supported: bool,
    allow_speculation: bool,
}

/// Build the answer prompt for the generative collaborator.
///
/// Blank history sides are skipped and the remaining text is trimmed.
pub fn build_answer_prompt(
    definition: &PromptDefinition,
    input: &AnswerPromptInput,
) -> AppResult<BuiltPrompt> {
    let documents: Vec<DocumentView<'_>> = input
        .chunks
        .iter()
        .take(MAX_PROMPT_DOCUMENTS)
        .enumerate()
        .map(|(i, text)| DocumentView {
            position: i + 1,
            text: text.as_str(),
        })
        .collect();

    let history: Vec<TurnView<'_>> = input
        .history
        .iter()
        .map(|turn| TurnView {
            question: turn.question.trim(),
            answer: turn.answer.trim(),
        })
        .filter(|turn| !turn.question.is_empty() || !turn.answer.is_empty())
        .collect();

    let documents_included = documents.len();
    let history_turns = history.len();

    let view = AnswerView {
        question: input.question.trim(),
        documents,
        history,
        supported: input.supported,
        allow_speculation: input.allow_speculation,
    };

    let user = render_template(&definition.template, &view)?;
    let system = definition.system.select(input.instruction).to_string();

    tracing::debug!(
        prompt_id = %definition.id,
        documents = documents_included,
        history_turns,
        "Built answer prompt"
    );

    Ok(BuiltPrompt {
        system,
        user,
        metadata: BuiltPromptMetadata {
            source_prompt_id: definition.id.clone(),
            documents_included,
            history_turns,
            instruction: input.instruction,
        },
    })
}

fn render_template<T: Serialize>(template: &str, data: &T) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text output, never HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", data)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
