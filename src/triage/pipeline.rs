//! Batch ingestion: categorize and extract action items for every email.

use log::{info, warn};

use crate::domain::{Category, Email, IngestOutcome, IngestRecord, PromptBook, PromptKey};
use crate::error::Result;
use crate::llm::{GenerationParams, TextGenerator};
use crate::triage::interpret::{categorize_email, extract_actions};

/// Runs over `inbox` once, in stored order, one email at a time.
///
/// Each email's `category` and `action_items` are overwritten. A failure on
/// one email leaves it untouched, is recorded against its index, and the run
/// moves on. Always returns exactly one record per email.
pub fn run_ingestion(
    generator: &dyn TextGenerator,
    inbox: &mut [Email],
    prompts: &PromptBook,
    params: GenerationParams,
) -> Vec<IngestRecord> {
    let mut results = Vec::with_capacity(inbox.len());

    for (idx, email) in inbox.iter_mut().enumerate() {
        let outcome = match process_email(generator, email, prompts, params) {
            Ok((category, action_items)) => {
                email.category = Some(category.clone());
                email.action_items = Some(action_items.clone());
                IngestOutcome::Processed {
                    category,
                    action_items,
                }
            }
            Err(e) => {
                warn!("ingestion failed for email {idx}: {e}");
                IngestOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        results.push(IngestRecord {
            email_idx: idx,
            outcome,
        });
    }

    let failed = results.iter().filter(|r| r.is_error()).count();
    info!("ingested {} emails ({failed} failed)", results.len());
    results
}

fn process_email(
    generator: &dyn TextGenerator,
    email: &Email,
    prompts: &PromptBook,
    params: GenerationParams,
) -> Result<(Category, Vec<String>)> {
    let cat_template = prompts.template(PromptKey::Categorize)?;
    let act_template = prompts.template(PromptKey::ExtractActions)?;

    let category = categorize_email(generator, email, cat_template, params);
    let actions = extract_actions(generator, email, act_template, params);
    Ok((category, actions))
}
