//! Status command handler.

use super::service::build_service;
use clap::Args;
use docchat_core::{config::AppConfig, AppResult};
use docchat_prompt::list_prompts;
use docchat_rag::ServiceStatus;
use serde::Serialize;

/// Show corpus and backend status
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Service status plus the prompt overrides found in the workspace.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    #[serde(flatten)]
    status: ServiceStatus,
    prompt_overrides: Vec<String>,
}

impl StatusCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let (service, _) = build_service(config)?;
        let report = StatusReport {
            status: service.status().await,
            prompt_overrides: list_prompts(&config.workspace)?,
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", render_report(&report));
        }

        Ok(())
    }
}

fn render_report(report: &StatusReport) -> String {
    let status = &report.status;
    let mut out = String::new();

    out.push_str(&format!("Mode:           {}\n", status.mode));
    out.push_str(&format!("Ready:          {}\n", status.ready));
    out.push_str(&format!("Chunks loaded:  {}\n", status.chunks_loaded));
    out.push_str(&format!("Indexing:       {}\n", status.indexing));
    match status.last_indexed_at {
        Some(at) => out.push_str(&format!("Last indexed:   {}\n", at.to_rfc3339())),
        None => out.push_str("Last indexed:   never\n"),
    }
    if let Some(error) = &status.last_index_error {
        out.push_str(&format!("Last error:     {}\n", error));
    }
    if let Some(products) = status.catalog_products {
        out.push_str(&format!("Products:       {}\n", products));
    }
    if !report.prompt_overrides.is_empty() {
        out.push_str(&format!(
            "Prompt overrides: {}\n",
            report.prompt_overrides.join(", ")
        ));
    }

    out
}
