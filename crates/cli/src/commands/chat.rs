//! Chat command handler.
//!
//! Interactive loop over stdin. History is kept for the whole session so
//! follow-up questions can refer back to earlier ones.

use super::ask::print_answer;
use super::service::build_service;
use clap::Args;
use docchat_core::{config::AppConfig, AppResult};
use docchat_rag::ChatService;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive session that keeps conversation history
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Never speculate; speculative or unsupported questions get a guarded answer
    #[arg(long)]
    pub strict: bool,

    /// Print each answer as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    Exit,
    Clear,
    Status,
    History,
    Unknown(&'a str),
    Question(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    match line {
        "" => Input::Empty,
        "/exit" | "/quit" => Input::Exit,
        "/clear" => Input::Clear,
        "/status" => Input::Status,
        "/history" => Input::History,
        cmd if cmd.starts_with('/') => Input::Unknown(cmd),
        question => Input::Question(question),
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting chat session");

        let (service, rag_config) = build_service(config)?;
        let allow_speculation = rag_config.allow_speculation && !self.strict;

        println!("DocChat ({} mode). Commands: /clear /status /history /exit", service.mode());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match parse_input(&line) {
                Input::Empty => continue,
                Input::Exit => break,
                Input::Clear => {
                    service.clear_history();
                    println!("History cleared.");
                }
                Input::Status => print_status(&service).await?,
                Input::History => {
                    for entry in service.history() {
                        println!("[{}] Q: {}", entry.timestamp.format("%H:%M:%S"), entry.question);
                        println!("A: {}", entry.answer);
                    }
                }
                Input::Unknown(cmd) => println!("Unknown command: {}", cmd),
                Input::Question(question) => {
                    let answer = service.answer(question, allow_speculation).await?;
                    print_answer(&answer, self.json)?;
                }
            }
        }

        tracing::info!("Chat session ended");
        Ok(())
    }
}

async fn print_status(service: &ChatService) -> AppResult<()> {
    let status = service.status().await;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("  "), Input::Empty);
        assert_eq!(parse_input("/exit"), Input::Exit);
        assert_eq!(parse_input(" /clear "), Input::Clear);
        assert_eq!(parse_input("/status"), Input::Status);
        assert_eq!(parse_input("/nope"), Input::Unknown("/nope"));
        assert_eq!(
            parse_input("What is the warranty?\n"),
            Input::Question("What is the warranty?")
        );
    }
}
