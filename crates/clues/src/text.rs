//! Text normalization and tokenization.

/// Collapse every whitespace run to a single space and trim the ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a question into lowercase alphanumeric terms.
///
/// Any run of characters outside `[a-z0-9]` separates terms. Order and
/// duplicates are preserved; there is no stemming or stopword removal.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
