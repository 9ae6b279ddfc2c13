use crate::domain::Email;

/// Concatenates every inbox message in `thread_id`, in stored order.
///
/// Returns `None` for a missing/empty id or when nothing matches, so callers
/// omit the context section instead of sending an empty one.
pub fn collect_thread_context(inbox: &[Email], thread_id: Option<&str>) -> Option<String> {
    let thread_id = thread_id.filter(|id| !id.is_empty())?;

    let blocks: Vec<String> = inbox
        .iter()
        .filter(|m| m.thread_id.as_deref() == Some(thread_id))
        .map(|m| format!("FROM: {}\nDATE: {}\n{}\n---\n", m.from, m.date, m.body))
        .collect();

    if blocks.is_empty() {
        None
    } else {
        Some(blocks.join("\n"))
    }
}
