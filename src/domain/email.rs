use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Position of an email in the inbox sequence. There is no stable id.
pub type EmailIdx = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub subject: String,
    /// Free text, never parsed.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// `None` means "not processed yet"; `Some(vec![])` is a real, empty result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_items: Option<Vec<String>>,
    /// Fields this crate does not know about, kept across load/save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Email {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        date: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            date: date.into(),
            body: body.into(),
            archived: false,
            thread_id: None,
            category: None,
            action_items: None,
            extra: Map::new(),
        }
    }

    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    /// One-line inbox label: sender, shortened subject, date and an optional tag
    /// (priority, or the first two labels when no priority is set).
    pub fn label(&self) -> String {
        let subject: String = self.subject.chars().take(40).collect();
        let tag = match &self.category {
            Some(cat) => match cat.priority() {
                Some(p) if !p.is_empty() => p.to_string(),
                _ => cat
                    .labels()
                    .into_iter()
                    .take(2)
                    .collect::<Vec<_>>()
                    .join(", "),
            },
            None => String::new(),
        };

        let mut out = format!("{} – {} ({})", self.from, subject, self.date);
        if !tag.is_empty() {
            out.push_str(&format!(" [{tag}]"));
        }
        out
    }

    /// High-priority filter. Uncategorized emails never qualify. The priority
    /// string stays opaque and is only compared case-insensitively here.
    pub fn is_urgent(&self) -> bool {
        let Some(cat) = &self.category else {
            return false;
        };
        if let Category::Structured(value) = cat
            && !value.is_object()
        {
            return false;
        }
        cat.priority()
            .is_some_and(|p| p.eq_ignore_ascii_case("high"))
            || cat.labels().contains(&"Important")
            || self.subject.to_lowercase().contains("urgent")
    }
}

/// Interpreted category output.
///
/// `Structured` holds whatever JSON the model produced, unvalidated.
/// `Raw` is the fallback for unparseable output and is stored as `{"text": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Category {
    Structured(Value),
    Raw(String),
}

impl Category {
    pub fn priority(&self) -> Option<&str> {
        self.field("priority").and_then(Value::as_str)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.field("labels")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn summary(&self) -> Option<&str> {
        self.field("summary").and_then(Value::as_str)
    }

    fn field(&self, key: &str) -> Option<&Value> {
        match self {
            Category::Structured(Value::Object(map)) => map.get(key),
            _ => None,
        }
    }
}

impl From<Value> for Category {
    fn from(value: Value) -> Self {
        if let Value::Object(map) = &value
            && map.len() == 1
            && let Some(Value::String(text)) = map.get("text")
        {
            return Category::Raw(text.clone());
        }
        Category::Structured(value)
    }
}

impl From<Category> for Value {
    fn from(category: Category) -> Self {
        match category {
            Category::Structured(value) => value,
            Category::Raw(text) => json!({ "text": text }),
        }
    }
}

/// The fixed four-message inbox used when no inbox file exists yet.
pub fn sample_inbox() -> Vec<Email> {
    vec![
        Email::new(
            "alice@company.com",
            "you@company.com",
            "Request: Q2 marketing budget approval",
            "2025-09-01",
            "Hi,\n\nCan you approve the Q2 marketing budget? We need a decision by Friday. \
             Attached are the numbers.\n\nThanks,\nAlice",
        ),
        Email::new(
            "bob@startup.com",
            "you@company.com",
            "Meeting: Product sync (tomorrow)",
            "2025-10-20",
            "Hello,\n\nCan we meet tomorrow at 10am to sync on the product roadmap? \
             Please confirm or propose another time.\n\nRegards,\nBob",
        ),
        Email::new(
            "carol@vendor.com",
            "you@company.com",
            "Invoice INV-2025-017 (overdue)",
            "2025-10-15",
            "Dear team,\n\nInvoice INV-2025-017 is overdue by 10 days. \
             Please arrange payment or contact us.\n\nBest,\nCarol",
        ),
        Email::new(
            "dave@partner.org",
            "you@company.com",
            "Collaboration opportunity - quick chat?",
            "2025-10-01",
            "Hi,\n\nWe have a potential collaboration. Interested in a 20-min call next week?\
             \n\nThanks,\nDave",
        ),
    ]
}
