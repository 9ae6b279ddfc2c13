pub mod config;
pub mod domain;
pub mod error;
pub mod llm;
pub mod mail;
pub mod store;
pub mod triage;

pub use error::{Result, TriageError};
