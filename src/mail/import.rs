//! Turns an RFC 822 message into an inbox entry.

use std::fs;
use std::path::Path;

use mailparse::MailHeaderMap;

use crate::domain::Email;
use crate::error::{Result, TriageError};
use crate::mail::decoders::{extract_text_body, message_ids};

pub fn parse_message_file(path: &Path) -> Result<Email> {
    let raw = fs::read(path).map_err(|source| TriageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_message(&raw)
}

/// Header values are decoded; `date` is kept as the raw header text.
/// The thread id is the thread root: first `References` id, else
/// `In-Reply-To`, else the message's own `Message-ID`.
pub fn parse_message(raw: &[u8]) -> Result<Email> {
    let parsed = mailparse::parse_mail(raw).map_err(|e| TriageError::Parse(e.to_string()))?;
    let header = |name: &str| {
        parsed
            .headers
            .get_first_value(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    let thread_id = ["References", "In-Reply-To", "Message-ID"]
        .into_iter()
        .find_map(|name| message_ids(&header(name)).into_iter().next());

    let mut email = Email::new(
        header("From"),
        header("To"),
        header("Subject"),
        header("Date"),
        extract_text_body(&parsed).trim().to_string(),
    );
    email.thread_id = thread_id;
    Ok(email)
}
