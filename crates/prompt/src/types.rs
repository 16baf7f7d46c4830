//! Prompt types for DocChat.

use serde::{Deserialize, Serialize};

/// A prompt definition loaded from YAML or taken from the built-in set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// User message template (Handlebars)
    pub template: String,

    /// System instruction templates, one per instruction kind
    #[serde(default)]
    pub system: SystemTemplates,
}

/// System instruction texts keyed by [`SystemInstruction`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemTemplates {
    pub strict: String,
    pub speculative: String,
    pub grounded: String,
}

impl Default for SystemTemplates {
    fn default() -> Self {
        Self {
            strict: crate::defaults::STRICT_SYSTEM.to_string(),
            speculative: crate::defaults::SPECULATIVE_SYSTEM.to_string(),
            grounded: crate::defaults::GROUNDED_SYSTEM.to_string(),
        }
    }
}

impl SystemTemplates {
    /// Text for the given instruction kind.
    pub fn select(&self, instruction: SystemInstruction) -> &str {
        match instruction {
            SystemInstruction::StrictContext => &self.strict,
            SystemInstruction::LabeledSpeculation => &self.speculative,
            SystemInstruction::Grounded => &self.grounded,
        }
    }
}

/// Which system-level instruction accompanies an answer prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemInstruction {
    /// Context only; speculation is not allowed for this request.
    StrictContext,
    /// Speculation allowed but must be labeled.
    LabeledSpeculation,
    /// Plain context-grounded answering.
    Grounded,
}

/// One prior exchange rendered into the prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub question: String,
    pub answer: String,
}

/// Everything the answer template needs.
#[derive(Debug, Clone)]
pub struct AnswerPromptInput {
    pub question: String,
    /// Ranked chunks, best first
    pub chunks: Vec<String>,
    /// Oldest turn first
    pub history: Vec<HistoryTurn>,
    pub supported: bool,
    pub allow_speculation: bool,
    pub instruction: SystemInstruction,
}

/// A fully built prompt ready for the generative collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System instruction
    pub system: String,

    /// User message
    pub user: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    #[serde(rename = "documentsIncluded")]
    pub documents_included: usize,

    #[serde(rename = "historyTurns")]
    pub history_turns: usize,

    pub instruction: SystemInstruction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_definition_deserialization_defaults_system() {
        let yaml = r#"
id: rag.answer
title: Custom Answer
apiVersion: "1.0"
template: "Q: {{question}}"
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "rag.answer");
        assert_eq!(def.created_by, "");
        assert_eq!(
            def.system.select(SystemInstruction::StrictContext),
            crate::defaults::STRICT_SYSTEM
        );
    }

    #[test]
    fn test_system_templates_select() {
        let templates = SystemTemplates {
            strict: "a".to_string(),
            speculative: "b".to_string(),
            grounded: "c".to_string(),
        };
        assert_eq!(templates.select(SystemInstruction::StrictContext), "a");
        assert_eq!(templates.select(SystemInstruction::LabeledSpeculation), "b");
        assert_eq!(templates.select(SystemInstruction::Grounded), "c");
    }
}
