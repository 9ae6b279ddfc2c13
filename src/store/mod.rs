pub mod json;
pub mod repo;

pub use json::{JsonRepo, load_json, save_json};
pub use repo::TriageRepository;
