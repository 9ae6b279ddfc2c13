pub mod email;
pub mod prompt;
pub mod results;

pub use email::{Category, Email, EmailIdx, sample_inbox};
pub use prompt::{PromptBook, PromptBuilder, PromptKey, PromptTemplate};
pub use results::{
    AnalysisKind, AnalysisRecord, DraftMetadata, DraftRecord, IngestOutcome, IngestRecord,
    SavedResults,
};
