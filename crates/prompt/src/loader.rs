//! Prompt loader.
//!
//! A workspace may override a built-in prompt by placing `<id>.yml` under
//! `.docchat/prompts/`. Without an override the built-in definition is used.

use crate::defaults;
use crate::types::PromptDefinition;
use docchat_core::{config::STATE_DIR, AppError, AppResult};
use std::path::{Path, PathBuf};

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(STATE_DIR).join("prompts")
}

/// Load a prompt definition by ID.
///
/// # Example
/// ```no_run
/// use docchat_prompt::{load_prompt, ANSWER_PROMPT_ID};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), ANSWER_PROMPT_ID)?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    if !prompt_file.exists() {
        tracing::debug!("No override at {:?}; using built-in prompt", prompt_file);
        return defaults::builtin(prompt_id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// List prompt IDs overridden in the workspace.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let dir = prompts_dir(workspace_path);

    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut prompt_ids = Vec::new();

    for entry in walkdir::WalkDir::new(&dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                prompt_ids.push(stem.to_string());
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_prompt(workspace: &Path, id: &str, body: &str) {
        let dir = prompts_dir(workspace);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{}.yml", id)), body).unwrap();
    }

    #[test]
    fn test_builtin_used_without_override() {
        let temp = TempDir::new().unwrap();
        let def = load_prompt(temp.path(), defaults::ANSWER_PROMPT_ID).unwrap();
        assert_eq!(def.created_by, "docchat");
        assert!(def.template.contains("Question: {{question}}"));
    }

    #[test]
    fn test_unknown_prompt_without_override() {
        let temp = TempDir::new().unwrap();
        let result = load_prompt(temp.path(), "nope");
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_workspace_override_wins() {
        let temp = TempDir::new().unwrap();
        write_prompt(
            temp.path(),
            "rag.answer",
            "id: rag.answer\ntitle: Terse\napiVersion: \"1.1\"\ntemplate: \"Q: {{question}}\"\n",
        );

        let def = load_prompt(temp.path(), "rag.answer").unwrap();
        assert_eq!(def.title, "Terse");
        assert_eq!(def.template, "Q: {{question}}");
        assert_eq!(list_prompts(temp.path()).unwrap(), vec!["rag.answer"]);
    }

    #[test]
    fn test_invalid_api_version_rejected() {
        let temp = TempDir::new().unwrap();
        write_prompt(
            temp.path(),
            "rag.answer",
            "id: rag.answer\ntitle: Bad\napiVersion: \"1\"\ntemplate: \"x\"\n",
        );

        assert!(load_prompt(temp.path(), "rag.answer").is_err());
    }
}
