use serde::{Deserialize, Serialize};

use crate::domain::email::{Category, Email, EmailIdx};

/// The results document: two append-only logs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedResults {
    #[serde(default)]
    pub drafts: Vec<DraftRecord>,
    #[serde(default)]
    pub analyses: Vec<AnalysisRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub time: String,
    #[serde(flatten)]
    pub kind: AnalysisKind,
}

impl AnalysisRecord {
    pub fn now(kind: AnalysisKind) -> Self {
        Self {
            time: timestamp(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisKind {
    Categorize {
        email_idx: EmailIdx,
        output: Category,
    },
    ExtractActions {
        email_idx: EmailIdx,
        output: Vec<String>,
    },
    Chat {
        email_idx: EmailIdx,
        question: String,
        output: String,
    },
    IngestBatch {
        result: IngestRecord,
    },
}

/// Per-email outcome of one ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestRecord {
    pub email_idx: EmailIdx,
    #[serde(flatten)]
    pub outcome: IngestOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IngestOutcome {
    Processed {
        category: Category,
        action_items: Vec<String>,
    },
    Failed {
        error: String,
    },
}

impl IngestRecord {
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, IngestOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRecord {
    pub time: String,
    pub email_idx: EmailIdx,
    pub subject: String,
    pub body: String,
    pub metadata: DraftMetadata,
}

impl DraftRecord {
    /// Snapshot of the email's category and action items at save time.
    pub fn for_email(email_idx: EmailIdx, email: &Email, body: String) -> Self {
        Self {
            time: timestamp(),
            email_idx,
            subject: format!("Re: {}", email.subject),
            body,
            metadata: DraftMetadata {
                category: email.category.clone(),
                action_items: email.action_items.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftMetadata {
    pub category: Option<Category>,
    pub action_items: Option<Vec<String>>,
}

/// UTC wall-clock time, `YYYY-MM-DD HH:MM:SS.ffffff`.
pub fn timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn analysis_records_are_type_tagged() {
        let rec = AnalysisRecord {
            time: "t".into(),
            kind: AnalysisKind::Chat {
                email_idx: 2,
                question: "when?".into(),
                output: "Friday".into(),
            },
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            v,
            json!({ "time": "t", "type": "chat", "email_idx": 2, "question": "when?", "output": "Friday" })
        );
        assert_eq!(serde_json::from_value::<AnalysisRecord>(v).unwrap(), rec);
    }

    #[test]
    fn ingest_batch_records_nest_the_pipeline_result() {
        let rec = AnalysisRecord {
            time: "t".into(),
            kind: AnalysisKind::IngestBatch {
                result: IngestRecord {
                    email_idx: 0,
                    outcome: IngestOutcome::Failed {
                        error: "boom".into(),
                    },
                },
            },
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["type"], "ingest_batch");
        assert_eq!(v["result"], json!({ "email_idx": 0, "error": "boom" }));
    }

    #[test]
    fn processed_ingest_record_reads_back() {
        let v = json!({
            "email_idx": 3,
            "category": { "text": "[MOCK RESPONSE] ..." },
            "action_items": ["a"]
        });
        let rec: IngestRecord = serde_json::from_value(v).unwrap();
        assert!(!rec.is_error());
        assert_eq!(
            rec.outcome,
            IngestOutcome::Processed {
                category: Category::Raw("[MOCK RESPONSE] ...".into()),
                action_items: vec!["a".into()],
            }
        );
    }

    #[test]
    fn draft_snapshot_keeps_nulls_for_unprocessed_email() {
        let email = Email::new("a", "b", "Budget", "d", "body");
        let draft = DraftRecord::for_email(1, &email, "Sure.".into());
        assert_eq!(draft.subject, "Re: Budget");

        let v = serde_json::to_value(&draft).unwrap();
        assert_eq!(v["metadata"], json!({ "category": null, "action_items": null }));
    }

    #[test]
    fn empty_document_defaults_to_empty_logs() {
        let res: SavedResults = serde_json::from_value(json!({})).unwrap();
        assert!(res.drafts.is_empty() && res.analyses.is_empty());
    }

    #[test]
    fn timestamp_has_microsecond_precision() {
        let ts = timestamp();
        assert_eq!(ts.len(), "2025-01-01 00:00:00.000000".len());
    }
}
