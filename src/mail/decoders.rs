use mailparse::ParsedMail;

/// Best text body of a message: the first text/plain part, else the first
/// text/html part rendered to text, else the top-level body.
pub fn extract_text_body(parsed: &ParsedMail) -> String {
    if let Some(text) = find_part(parsed, "text/plain") {
        return text;
    }
    if let Some(html) = find_part(parsed, "text/html") {
        return html_to_text(&html);
    }
    parsed.get_body().unwrap_or_default()
}

fn find_part(p: &ParsedMail, mimetype: &str) -> Option<String> {
    if p.subparts.is_empty() && p.ctype.mimetype.eq_ignore_ascii_case(mimetype) {
        return p.get_body().ok();
    }
    p.subparts.iter().find_map(|sp| find_part(sp, mimetype))
}

pub fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), 100).unwrap_or_else(|_| html.to_string())
}

/// Message ids (`<...>`) in a Message-ID / In-Reply-To / References value.
pub fn message_ids(value: &str) -> Vec<String> {
    value
        .split('<')
        .skip(1)
        .filter_map(|chunk| chunk.split_once('>'))
        .map(|(id, _)| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}
