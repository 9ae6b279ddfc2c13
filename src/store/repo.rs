use crate::domain::{Email, PromptBook, SavedResults};
use crate::error::Result;

/// Whole-document access to the three stores. Every save replaces the full
/// document; there is no locking and the last writer wins.
pub trait TriageRepository: Send + Sync {
    fn load_prompts(&self) -> Result<PromptBook>;
    fn save_prompts(&self, prompts: &PromptBook) -> Result<()>;

    fn load_inbox(&self) -> Result<Vec<Email>>;
    fn save_inbox(&self, inbox: &[Email]) -> Result<()>;

    fn load_results(&self) -> Result<SavedResults>;
    fn save_results(&self, results: &SavedResults) -> Result<()>;
}
