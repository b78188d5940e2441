use regex::Regex;
use std::sync::OnceLock;

/// Spacer appended after every extracted page before normalization
pub const PAGE_SPACER: &str = " \n\n";

fn collapsible() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s{2,}|\r\n|\n|\r").expect("static pattern"))
}

/// Flatten raw extracted text into a single line of practice text.
///
/// Runs of two or more whitespace characters and every line break become a
/// single space, then the result is trimmed. A lone tab or other single
/// whitespace character is kept as-is.
pub fn normalize(raw: &str) -> String {
    collapsible().replace_all(raw, " ").trim().to_string()
}

/// True when normalization left nothing worth typing
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
