//! Built-in prompt definitions.

use crate::types::{PromptDefinition, SystemTemplates};

/// Identifier of the answer prompt.
pub const ANSWER_PROMPT_ID: &str = "rag.answer";

pub const STRICT_SYSTEM: &str = "Answer only using the provided context. If unsupported or futuristic, \
say it is not in the knowledge base and provide a cautious inference if possible.";

pub const SPECULATIVE_SYSTEM: &str =
    "Answer using the provided context. If you speculate, clearly label it as speculative.";

pub const GROUNDED_SYSTEM: &str =
    "Answer using the provided context from documents and conversation history.";

const ANSWER_TEMPLATE: &str = "Role:
- You are a helpful assistant that answers using document context and conversation history.

Rules:
- Never fabricate facts not present in the documents or conversation.
- If the user asks about the conversation, use the history even if the documents don't mention it.
{{#if allow_speculation~}}
- If the question is speculative, you may answer but label it as speculative.
{{else~}}
- If the question is speculative or future-oriented and not supported, say it is not in the knowledge base and provide a cautious inference if possible.
{{/if~}}
{{#unless supported~}}
- Retrieved context does not confidently support a direct answer; be explicit about limits.
{{/unless}}

Data:
Document Context:
{{#each documents~}}
[Document {{this.position}}]
{{this.text}}
{{/each~}}
{{#if history}}

Conversation History:
{{#each history~}}
{{#if this.question}}User: {{this.question}}
{{/if~}}
{{#if this.answer}}Assistant: {{this.answer}}
{{/if~}}
{{/each~}}
{{/if}}

Task:
Answer the question below using the data above.
Question: {{question}}
Answer:";

/// Built-in definition for `id`, if one exists.
pub fn builtin(id: &str) -> Option<PromptDefinition> {
    match id {
        ANSWER_PROMPT_ID => Some(PromptDefinition {
            id: ANSWER_PROMPT_ID.to_string(),
            title: "Document-grounded answer".to_string(),
            api_version: "1.0".to_string(),
            created_by: "docchat".to_string(),
            template: ANSWER_TEMPLATE.to_string(),
            system: SystemTemplates::default(),
        }),
        _ => None,
    }
}
