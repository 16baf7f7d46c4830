//! Ask command handler.
//!
//! Answers one question. The conversation window only lives for this
//! process, so conversation references see no history here.

use super::service::build_service;
use clap::Args;
use docchat_core::{config::AppConfig, AppError, AppResult};
use docchat_rag::ChatAnswer;

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Never speculate; speculative or unsupported questions get a guarded answer
    #[arg(long)]
    pub strict: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let question = self.question.join(" ");
        let (service, rag_config) = build_service(config)?;
        let allow_speculation = rag_config.allow_speculation && !self.strict;

        let answer = service.answer(&question, allow_speculation).await?;
        print_answer(&answer, self.json)
    }
}

/// Write an answer to stdout, as the JSON envelope or as plain text.
pub fn print_answer(answer: &ChatAnswer, json: bool) -> AppResult<()> {
    if json {
        let json = serde_json::to_string_pretty(answer)
            .map_err(|e| AppError::Serialization(e.to_string()))?;
        println!("{}", json);
    } else {
        println!("{}", render_answer(answer));
    }
    Ok(())
}

fn render_answer(answer: &ChatAnswer) -> String {
    let mut text = answer.answer.clone();

    if !answer.media.is_empty() {
        text.push('\n');
        for path in &answer.media {
            text.push_str(&format!("\nImage: {}", path));
        }
    }

    if answer.speculative {
        text.push_str("\n\n(speculative)");
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchat_rag::{Intent, RetrievalMethod};

    fn answer(media: Vec<String>, speculative: bool) -> ChatAnswer {
        ChatAnswer {
            answer: "Two years.".to_string(),
            intent: Intent::Fact,
            supported: true,
            speculative,
            retrieval_method: RetrievalMethod::Vector,
            media,
        }
    }

    #[test]
    fn test_render_plain_answer() {
        assert_eq!(render_answer(&answer(vec![], false)), "Two years.");
    }

    #[test]
    fn test_render_lists_images_and_speculation() {
        let text = render_answer(&answer(vec!["a.png".into(), "b.png".into()], true));
        assert_eq!(text, "Two years.\n\nImage: a.png\nImage: b.png\n\n(speculative)");
    }
}
