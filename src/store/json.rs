use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::{Email, PromptBook, SavedResults, sample_inbox};
use crate::error::{Result, TriageError};
use crate::store::repo::TriageRepository;

pub const PROMPTS_FILE: &str = "prompts.json";
pub const INBOX_FILE: &str = "inbox.json";
pub const RESULTS_FILE: &str = "saved_results.json";

/// Reads a JSON document. A missing file is an empty mapping, not an error.
pub fn load_json(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }
    let s = fs::read_to_string(path).map_err(|source| TriageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&s).map_err(|source| TriageError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a document as indented UTF-8 JSON, replacing the whole file.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, doc: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(doc).map_err(|source| TriageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, s).map_err(|source| TriageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("wrote {}", path.display());
    Ok(())
}

/// Flat-file store: one JSON document per concern inside `dir`.
pub struct JsonRepo {
    dir: PathBuf,
}

impl JsonRepo {
    /// Opens the store, seeding any missing document with its defaults
    /// (default prompts, the sample inbox, empty result logs).
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|source| TriageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let repo = Self {
            dir: dir.to_path_buf(),
        };
        repo.seed()?;
        Ok(repo)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn seed(&self) -> Result<()> {
        let prompts = self.path(PROMPTS_FILE);
        if !prompts.exists() {
            info!("seeding default prompts at {}", prompts.display());
            save_json(&prompts, &PromptBook::defaults())?;
        }
        let inbox = self.path(INBOX_FILE);
        if !inbox.exists() {
            info!("seeding sample inbox at {}", inbox.display());
            save_json(&inbox, &sample_inbox())?;
        }
        let results = self.path(RESULTS_FILE);
        if !results.exists() {
            save_json(&results, &SavedResults::default())?;
        }
        Ok(())
    }

    fn load_doc<T: DeserializeOwned>(&self, file: &str, empty: T) -> Result<T> {
        let path = self.path(file);
        match load_json(&path)? {
            Value::Object(map) if map.is_empty() && !path.exists() => Ok(empty),
            value => serde_json::from_value(value).map_err(|source| TriageError::Json { path, source }),
        }
    }
}

impl TriageRepository for JsonRepo {
    fn load_prompts(&self) -> Result<PromptBook> {
        self.load_doc(PROMPTS_FILE, PromptBook::default())
    }

    fn save_prompts(&self, prompts: &PromptBook) -> Result<()> {
        save_json(&self.path(PROMPTS_FILE), prompts)
    }

    fn load_inbox(&self) -> Result<Vec<Email>> {
        self.load_doc(INBOX_FILE, Vec::new())
    }

    fn save_inbox(&self, inbox: &[Email]) -> Result<()> {
        save_json(&self.path(INBOX_FILE), inbox)
    }

    fn load_results(&self) -> Result<SavedResults> {
        self.load_doc(RESULTS_FILE, SavedResults::default())
    }

    fn save_results(&self, results: &SavedResults) -> Result<()> {
        save_json(&self.path(RESULTS_FILE), results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn load_json_on_missing_path_is_empty_mapping() {
        let tmp = TempDir::new().unwrap();
        let v = load_json(&tmp.path().join("nope.json")).unwrap();
        assert_eq!(v, json!({}));
    }

    #[test]
    fn open_seeds_missing_documents() {
        let tmp = TempDir::new().unwrap();
        let repo = JsonRepo::open(tmp.path()).unwrap();

        assert_eq!(repo.load_prompts().unwrap(), PromptBook::defaults());
        assert_eq!(repo.load_inbox().unwrap(), sample_inbox());
        assert_eq!(repo.load_results().unwrap(), SavedResults::default());

        let raw = fs::read_to_string(tmp.path().join(RESULTS_FILE)).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&raw).unwrap(), json!({ "drafts": [], "analyses": [] }));
    }

    #[test]
    fn open_keeps_existing_documents() {
        let tmp = TempDir::new().unwrap();
        let inbox = vec![Email::new("a", "b", "only one", "d", "body")];
        save_json(&tmp.path().join(INBOX_FILE), &inbox).unwrap();

        let repo = JsonRepo::open(tmp.path()).unwrap();
        assert_eq!(repo.load_inbox().unwrap(), inbox);
    }

    #[test]
    fn files_are_indented_and_keep_non_ascii() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("doc.json");
        save_json(&path, &json!({ "subject": "Réunion – demain" })).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Réunion – demain"));
        assert!(raw.contains("\n  \"subject\""));
    }

    #[test]
    fn inbox_round_trip_preserves_unknown_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(INBOX_FILE);
        fs::write(
            &path,
            r#"[{"from":"a","to":"b","subject":"s","date":"d","body":"x","labels_ui":["pinned"]}]"#,
        )
        .unwrap();

        let repo = JsonRepo::open(tmp.path()).unwrap();
        let inbox = repo.load_inbox().unwrap();
        repo.save_inbox(&inbox).unwrap();

        let v = load_json(&path).unwrap();
        assert_eq!(v[0]["labels_ui"], json!(["pinned"]));
        assert_eq!(v[0]["archived"], json!(false));
    }

    #[test]
    fn deleted_document_loads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let repo = JsonRepo::open(tmp.path()).unwrap();
        fs::remove_file(tmp.path().join(INBOX_FILE)).unwrap();
        assert!(repo.load_inbox().unwrap().is_empty());
    }

    #[test]
    fn corrupt_document_is_a_json_error() {
        let tmp = TempDir::new().unwrap();
        let repo = JsonRepo::open(tmp.path()).unwrap();
        fs::write(tmp.path().join(PROMPTS_FILE), "{ not json").unwrap();
        assert!(matches!(repo.load_prompts(), Err(TriageError::Json { .. })));
    }
}
