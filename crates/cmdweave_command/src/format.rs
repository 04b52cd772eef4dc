//! Text helpers shared by usage rendering and the top-level boundary.

/// Separator between alternatives in usage strings.
pub const PIPE: &str = "|";
/// Marker for text cut short.
pub const ELLIPSIS: &str = "\u{2026}";
/// Prefix of every error line sent to a source.
pub const ERROR_PREFIX: &str = "[ERROR] ";

/// Formats an error line.
#[must_use]
pub fn error(text: &str) -> String {
    format!("{ERROR_PREFIX}{text}")
}

/// Makes fault text safe to show on one console: tabs become four spaces
/// and every line ending becomes `\n`.
#[must_use]
pub fn normalize_fault_text(text: &str) -> String {
    text.replace('\t', "    ")
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

/// Case-insensitive prefix test.
#[must_use]
pub fn starts_with_ignore_case(candidate: &str, prefix: &str) -> bool {
    candidate.to_lowercase().starts_with(&prefix.to_lowercase())
}

/// Appends the items of `more` that `into` does not already hold.
pub(crate) fn extend_unique(into: &mut Vec<String>, more: impl IntoIterator<Item = String>) {
    for item in more {
        if !into.contains(&item) {
            into.push(item);
        }
    }
}
