//! Term-frequency relevance scoring.
//!
//! For each term the score adds its substring occurrence count in the
//! lowercased content, plus one when the term also appears as a whole word.
//! Duplicate terms count once per occurrence in the term list.

use regex::Regex;

/// A single query term with its whole-word pattern.
#[derive(Debug, Clone)]
struct Term {
    text: String,
    whole_word: Option<Regex>,
}

/// Terms of one question, compiled once and reused for every candidate.
#[derive(Debug, Clone)]
pub struct QueryTerms {
    terms: Vec<Term>,
}

impl QueryTerms {
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Self {
        let terms = terms
            .iter()
            .map(|term| {
                let text = term.as_ref().to_lowercase();
                let pattern = format!(r"\b{}\b", regex::escape(&text));
                let whole_word = match Regex::new(&pattern) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        tracing::warn!("Whole-word pattern for {:?} rejected: {}", text, e);
                        None
                    }
                };
                Term { text, whole_word }
            })
            .collect();

        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Score one clue's content against these terms.
    pub fn score(&self, content: &str) -> u32 {
        let text = content.to_lowercase();
        let mut total: u32 = 0;

        for term in &self.terms {
            if term.text.is_empty() {
                continue;
            }

            let freq = text.matches(term.text.as_str()).count();
            if freq == 0 {
                continue;
            }

            total = total.saturating_add(u32::try_from(freq).unwrap_or(u32::MAX));
            if term
                .whole_word
                .as_ref()
                .is_some_and(|re| re.is_match(&text))
            {
                total = total.saturating_add(1);
            }
        }

        total
    }
}

/// Score `content` against `terms`.
///
/// Convenience wrapper over [`QueryTerms`] for one-off scoring.
pub fn score<S: AsRef<str>>(content: &str, terms: &[S]) -> u32 {
    QueryTerms::new(terms).score(content)
}
