use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKey {
    Categorize,
    ExtractActions,
    DraftReply,
    Chat,
}

impl PromptKey {
    pub const ALL: [PromptKey; 4] = [
        PromptKey::Categorize,
        PromptKey::ExtractActions,
        PromptKey::DraftReply,
        PromptKey::Chat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PromptKey::Categorize => "categorize",
            PromptKey::ExtractActions => "extract_actions",
            PromptKey::DraftReply => "draft_reply",
            PromptKey::Chat => "chat",
        }
    }
}

impl fmt::Display for PromptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptKey {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        PromptKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| TriageError::MissingPrompt(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub name: String,
    pub template: String,
}

/// The prompt store document: key -> template. Keys beyond the fixed four
/// are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptBook(BTreeMap<String, PromptTemplate>);

impl PromptBook {
    pub fn defaults() -> Self {
        let mut book = BTreeMap::new();
        for key in PromptKey::ALL {
            let (name, template) = default_template(key);
            book.insert(
                key.as_str().to_string(),
                PromptTemplate {
                    name: name.to_string(),
                    template: template.to_string(),
                },
            );
        }
        Self(book)
    }

    pub fn get(&self, key: PromptKey) -> Result<&PromptTemplate> {
        self.0
            .get(key.as_str())
            .ok_or_else(|| TriageError::MissingPrompt(key.to_string()))
    }

    pub fn template(&self, key: PromptKey) -> Result<&str> {
        self.get(key).map(|p| p.template.as_str())
    }

    /// Replaces the template text, keeping the display name. A missing entry is
    /// created with its default name.
    pub fn set_template(&mut self, key: PromptKey, template: impl Into<String>) {
        let template = template.into();
        match self.0.get_mut(key.as_str()) {
            Some(existing) => existing.template = template,
            None => {
                let (name, _) = default_template(key);
                self.0.insert(
                    key.as_str().to_string(),
                    PromptTemplate {
                        name: name.to_string(),
                        template,
                    },
                );
            }
        }
    }

    pub fn remove(&mut self, key: PromptKey) -> Option<PromptTemplate> {
        self.0.remove(key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PromptTemplate)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn default_template(key: PromptKey) -> (&'static str, &'static str) {
    match key {
        PromptKey::Categorize => (
            "Categorize Email",
            "Categorize this email and respond ONLY in JSON.\n\
             {\n  \"labels\": [\"...\"],\n  \"priority\": \"low/medium/high\",\n  \"summary\": \"short summary\"\n}",
        ),
        PromptKey::ExtractActions => (
            "Extract Action Items",
            "Extract action items from this email. Respond in JSON array.\n\
             [ \"task 1\", \"task 2\", ... ]",
        ),
        PromptKey::DraftReply => (
            "Draft Reply",
            "Draft a polite, concise reply.\n\
             Address the sender, mention key points, and propose next steps.\n\
             Keep it under 180 words.",
        ),
        PromptKey::Chat => (
            "Chat about email",
            "You are an assistant that answers user questions based strictly \
             on the email content. Be concise.",
        ),
    }
}

/// Assembles the final prompt text: the template followed by labeled sections,
/// each rendered as `"\n\n" + LABEL + ":\n" + text`.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    text: String,
}

impl PromptBuilder {
    pub fn new(template: &str) -> Self {
        Self {
            text: template.to_string(),
        }
    }

    pub fn section(mut self, label: &str, content: &str) -> Self {
        self.text.push_str("\n\n");
        self.text.push_str(label);
        self.text.push_str(":\n");
        self.text.push_str(content);
        self
    }

    /// Absent or empty content omits the section entirely.
    pub fn optional_section(self, label: &str, content: Option<&str>) -> Self {
        match content {
            Some(c) if !c.is_empty() => self.section(label, c),
            _ => self,
        }
    }

    pub fn build(self) -> String {
        self.text
    }
}
