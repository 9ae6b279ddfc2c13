//! Best-effort interpreters for model output. None of them fail on odd
//! output; they degrade to a raw representation instead.

use log::debug;
use serde_json::Value;

use crate::domain::{Category, Email, PromptBuilder};
use crate::error::{Result, TriageError};
use crate::llm::{GenerationParams, TextGenerator};

const BULLET_CHARS: &[char] = &[' ', '-', '•', '\t'];

pub fn categorize_email(
    generator: &dyn TextGenerator,
    email: &Email,
    template: &str,
    params: GenerationParams,
) -> Category {
    let prompt = PromptBuilder::new(template)
        .section("Email", &email.body)
        .build();
    parse_category(&generator.generate(&prompt, params))
}

/// Strips ```json / ``` fences and parses strictly. Any valid JSON is kept
/// as-is; anything else becomes `Raw` with the untouched output.
pub fn parse_category(output: &str) -> Category {
    let cleaned = output.replace("```json", "").replace("```", "");
    match serde_json::from_str::<Value>(cleaned.trim()) {
        Ok(value) => Category::Structured(value),
        Err(e) => {
            debug!("category output is not JSON ({e}); keeping raw text");
            Category::Raw(output.to_string())
        }
    }
}

pub fn extract_actions(
    generator: &dyn TextGenerator,
    email: &Email,
    template: &str,
    params: GenerationParams,
) -> Vec<String> {
    let prompt = PromptBuilder::new(template)
        .section("EMAIL", &email.body)
        .build();
    parse_action_items(&generator.generate(&prompt, params))
}

/// A JSON array when the output looks like one, otherwise one item per
/// non-blank line with bullet markers stripped. Wrapped sentences become
/// several items.
pub fn parse_action_items(output: &str) -> Vec<String> {
    if output.trim().starts_with('[') {
        match serde_json::from_str::<Vec<Value>>(output) {
            Ok(items) => {
                return items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect();
            }
            Err(e) => debug!("action output looked like JSON but failed to parse: {e}"),
        }
    }

    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_matches(BULLET_CHARS).to_string())
        .collect()
}

pub fn draft_reply(
    generator: &dyn TextGenerator,
    email: &Email,
    template: &str,
    params: GenerationParams,
    thread_context: Option<&str>,
) -> String {
    let prompt = PromptBuilder::new(template)
        .section("EMAIL", &email.body)
        .optional_section("THREAD CONTEXT", thread_context)
        .build();
    generator.generate(&prompt, params).trim().to_string()
}

/// Free-form question about one email. Blank questions never reach the model.
pub fn answer_question(
    generator: &dyn TextGenerator,
    email: &Email,
    template: &str,
    question: &str,
    params: GenerationParams,
) -> Result<String> {
    if question.trim().is_empty() {
        return Err(TriageError::EmptyQuestion);
    }
    let prompt = PromptBuilder::new(template)
        .section("EMAIL CONTENT", &email.body)
        .section("USER QUESTION", question)
        .build();
    Ok(generator.generate(&prompt, params))
}
