//! Answer synthesis.
//!
//! Picks one of four answer paths, in order:
//!
//! 1. no chunks and no history: fixed no-information message
//! 2. speculation disallowed and the question is speculative or unsupported
//!    (and not about the conversation): local guardrail answer
//! 3. a generative collaborator is available: prompt it
//! 4. otherwise, or if generation fails: extractive answer from the top chunk

use crate::text::{excerpt, split_sentences, truncate_with_ellipsis};
use crate::types::{ChatEntry, Intent};
use docchat_llm::{LlmClient, LlmRequest};
use docchat_prompt::{
    build_answer_prompt, AnswerPromptInput, HistoryTurn, PromptDefinition, SystemInstruction,
};
use std::sync::Arc;

const GUARDRAIL_EXCERPT_CHARS: usize = 400;
const EXTRACTIVE_MAX_CHARS: usize = 500;
const MIN_KEYWORD_CHARS: usize = 4;

pub const EMPTY_CORPUS_MESSAGE: &str = "I couldn't find relevant information in the documents to answer your question. \
Please make sure the documents folder contains files and run a reindex.";

pub const NO_MATCH_MESSAGE: &str = "I couldn't find relevant information in the documents to answer your question. \
Try rephrasing your question or asking about a different topic.";

pub const NO_CONTEXT_MESSAGE: &str = "I couldn't find relevant information to answer your question.";

pub const GUARDRAIL_DISCLAIMER: &str = "This question goes beyond the current knowledge base or is speculative. \
I can't confirm a direct answer from the documents.";

/// Everything the synthesizer needs for one question.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisRequest<'a> {
    pub question: &'a str,
    /// Ranked chunks, best first
    pub chunks: &'a [String],
    /// Oldest first
    pub history: &'a [ChatEntry],
    pub intent: Intent,
    pub supported: bool,
    pub allow_speculation: bool,
    pub conversation_ref: bool,
    /// Distinguishes "nothing indexed" from "nothing matched"
    pub corpus_empty: bool,
}

/// Which path produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerPath {
    NoInformation,
    Guardrail,
    Generated,
    Extractive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub answer: String,
    pub path: AnswerPath,
}

impl Synthesis {
    fn new(answer: String, path: AnswerPath) -> Self {
        Self { answer, path }
    }
}

/// Chooses the answer path and drives the generative collaborator.
pub struct AnswerSynthesizer {
    llm: Option<Arc<dyn LlmClient>>,
    prompt: PromptDefinition,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnswerSynthesizer {
    /// Synthesizer without a generative collaborator; path 3 always falls
    /// through to the extractive answer.
    pub fn new(prompt: PromptDefinition) -> Self {
        Self {
            llm: None,
            prompt,
            model: String::new(),
            temperature: 0.7,
            max_tokens: 500,
        }
    }

    pub fn with_llm(mut self, client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        self.llm = Some(client);
        self.model = model.into();
        self
    }

    pub fn with_generation(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    pub async fn synthesize(&self, request: &SynthesisRequest<'_>) -> Synthesis {
        if request.chunks.is_empty() && request.history.is_empty() {
            return Synthesis::new(
                no_information_answer(request.corpus_empty).to_string(),
                AnswerPath::NoInformation,
            );
        }

        let guarded = !request.allow_speculation
            && (request.intent.is_speculative() || !request.supported)
            && !request.conversation_ref;

        if guarded {
            tracing::info!(
                reason = "guardrail",
                intent = %request.intent,
                supported = request.supported,
                "llm_skipped"
            );
            return Synthesis::new(
                guardrail_answer(request.chunks.first().map(String::as_str)),
                AnswerPath::Guardrail,
            );
        }

        match self.generate(request).await {
            Some(answer) => Synthesis::new(answer, AnswerPath::Generated),
            None => Synthesis::new(
                extractive_answer(request.question, request.chunks),
                AnswerPath::Extractive,
            ),
        }
    }

    /// `None` whenever the extractive fallback should be used instead.
    async fn generate(&self, request: &SynthesisRequest<'_>) -> Option<String> {
        let Some(client) = &self.llm else {
            tracing::debug!("No generative collaborator configured, using extractive answer");
            return None;
        };

        let input = AnswerPromptInput {
            question: request.question.to_string(),
            chunks: request.chunks.to_vec(),
            history: request
                .history
                .iter()
                .map(|entry| HistoryTurn {
                    question: entry.question.clone(),
                    answer: entry.answer.clone(),
                })
                .collect(),
            supported: request.supported,
            allow_speculation: request.allow_speculation,
            instruction: system_instruction(request.intent, request.allow_speculation),
        };

        let prompt = match build_answer_prompt(&self.prompt, &input) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::warn!("Failed to build answer prompt, using extractive answer: {}", e);
                return None;
            }
        };

        tracing::debug!(system = %prompt.system, "llm_system");
        tracing::debug!(prompt = %prompt.user, "llm_prompt");

        let llm_request = LlmRequest::new(prompt.user, self.model.clone())
            .with_system(prompt.system)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        match client.complete(&llm_request).await {
            Ok(response) => {
                let content = response.content.trim();
                if content.is_empty() {
                    tracing::warn!("Empty completion from {}, using extractive answer", client.provider_name());
                    None
                } else {
                    Some(content.to_string())
                }
            }
            Err(e) => {
                tracing::warn!("Generation failed, using extractive answer: {}", e);
                None
            }
        }
    }
}

/// Instruction kind sent alongside the answer prompt.
pub fn system_instruction(intent: Intent, allow_speculation: bool) -> SystemInstruction {
    if !allow_speculation {
        SystemInstruction::StrictContext
    } else if intent.is_speculative() {
        SystemInstruction::LabeledSpeculation
    } else {
        SystemInstruction::Grounded
    }
}

pub fn no_information_answer(corpus_empty: bool) -> &'static str {
    if corpus_empty {
        EMPTY_CORPUS_MESSAGE
    } else {
        NO_MATCH_MESSAGE
    }
}

/// Fixed disclaimer, an excerpt of the top chunk if there is one, and an
/// invitation to enable speculation.
pub fn guardrail_answer(top_chunk: Option<&str>) -> String {
    let mut answer = format!("{}\n\n", GUARDRAIL_DISCLAIMER);

    match top_chunk {
        Some(chunk) => {
            answer.push_str("From the documents, the most relevant context is:\n");
            answer.push_str(&excerpt(chunk, GUARDRAIL_EXCERPT_CHARS));
            answer.push_str("\n\nIf you'd like, you can enable speculative answers for a reasoned guess.");
        }
        None => {
            answer.push_str("If you'd like a speculative answer, enable speculative mode.");
        }
    }

    answer
}

/// Sentences of the top chunk that mention a question keyword, or the whole
/// chunk when none do.
pub fn extractive_answer(question: &str, chunks: &[String]) -> String {
    let Some(top) = chunks.first() else {
        return NO_CONTEXT_MESSAGE.to_string();
    };

    let keywords = question_keywords(question);
    let matching: Vec<&str> = split_sentences(top)
        .into_iter()
        .filter(|sentence| {
            let lowered = sentence.to_lowercase();
            keywords.iter().any(|word| lowered.contains(word.as_str()))
        })
        .collect();

    let answer = if matching.is_empty() {
        top.trim().to_string()
    } else {
        matching.join(" ")
    };

    truncate_with_ellipsis(&answer, EXTRACTIVE_MAX_CHARS)
}

fn question_keywords(question: &str) -> Vec<String> {
    question
        .split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|word| word.chars().count() >= MIN_KEYWORD_CHARS)
        .collect()
}
