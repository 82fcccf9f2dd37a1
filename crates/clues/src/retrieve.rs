//! Keyword retrieval over the clue store.

use crate::score::QueryTerms;
use crate::store::ClueStore;
use crate::text::tokenize;
use crate::types::{ClueRecord, RetrievalResult, ScoredClue};
use arena_core::config::RetrievalConfig;
use arena_core::AppResult;

/// Turns a free-text question into ranked, bounded context.
pub struct Retriever<'a> {
    store: &'a ClueStore,
    config: RetrievalConfig,
}

impl<'a> Retriever<'a> {
    pub fn new(store: &'a ClueStore, config: RetrievalConfig) -> Self {
        Self { store, config }
    }

    /// Number of clues returned when the caller does not ask for another count.
    pub fn default_top_k(&self) -> usize {
        self.config.top_k
    }

    /// Retrieve up to `top_k` clues for `question`.
    ///
    /// Candidates come from an OR-ed substring scan; when nothing matches,
    /// an unfiltered sample stands in so the Game Master still has context.
    /// Ranking is a stable sort on score, so ties keep scan order. Clues
    /// scoring zero are kept.
    pub fn retrieve(&self, question: &str, top_k: usize) -> AppResult<RetrievalResult> {
        let terms = tokenize(question);
        if terms.is_empty() {
            tracing::debug!("Question has no searchable terms");
            return Ok(RetrievalResult::default());
        }

        let mut candidates = self
            .store
            .scan_matching(&terms, self.config.candidate_limit)?;

        if candidates.is_empty() {
            tracing::debug!(
                "No clue matched {:?}; sampling up to {} clues",
                terms,
                self.config.fallback_limit
            );
            candidates = self.store.sample_any(self.config.fallback_limit)?;
        }

        let ranked = rank(candidates, &QueryTerms::new(&terms));
        let selected: Vec<ClueRecord> = ranked
            .into_iter()
            .take(top_k)
            .map(|scored| scored.record)
            .collect();

        tracing::debug!(
            "Retrieved {} clues for {} terms (requested top-{})",
            selected.len(),
            terms.len(),
            top_k
        );

        Ok(RetrievalResult::from_ranked(selected))
    }
}

/// Score candidates and order them by descending score, ties in input order.
pub fn rank(candidates: Vec<ClueRecord>, query: &QueryTerms) -> Vec<ScoredClue> {
    let mut scored: Vec<ScoredClue> = candidates
        .into_iter()
        .map(|record| {
            let score = query.score(&record.content);
            ScoredClue { record, score }
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(contents: &[&str]) -> ClueStore {
        let store = ClueStore::open_in_memory().unwrap();
        for content in contents {
            store.insert(content).unwrap();
        }
        store
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let candidates = vec![
            ClueRecord::new(1, "a key"),
            ClueRecord::new(2, "the key"),
            ClueRecord::new(3, "one key"),
        ];
        let ranked = rank(candidates, &QueryTerms::new(&["key"]));

        let ids: Vec<i64> = ranked.iter().map(|s| s.record.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(ranked.iter().all(|s| s.score == 2));
    }

    #[test]
    fn test_rank_orders_by_score() {
        let candidates = vec![
            ClueRecord::new(1, "keyhole"),
            ClueRecord::new(2, "key and key"),
            ClueRecord::new(3, "a key"),
        ];
        let ranked = rank(candidates, &QueryTerms::new(&["key"]));

        let ids: Vec<i64> = ranked.iter().map(|s| s.record.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_default_top_k() {
        let store = store_with(&[]);
        let retriever = Retriever::new(&store, RetrievalConfig::default());
        assert_eq!(retriever.default_top_k(), 5);
    }

    #[test]
    fn test_custom_candidate_limit() {
        let store = store_with(&["key one", "key two", "key three"]);
        let config = RetrievalConfig {
            candidate_limit: 2,
            ..RetrievalConfig::default()
        };
        let result = Retriever::new(&store, config).retrieve("key", 10).unwrap();
        assert_eq!(result.sources.len(), 2);
    }
}
