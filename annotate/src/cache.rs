use ahash::AHashMap;

use crate::record::{Evaluation, PositionKey};

/// Move evaluations for exactly one position under one engine.
///
/// Entries never outlive their position: a lookup or insert under any other key misses.
#[derive(Debug, Default)]
pub struct EvaluationCache {
    position: Option<PositionKey>,
    entries: AHashMap<String, Evaluation>,
}

impl EvaluationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every entry and rescopes the cache.
    pub fn reset(&mut self, position: Option<PositionKey>) {
        self.entries.clear();
        self.position = position;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn position(&self) -> Option<&PositionKey> {
        self.position.as_ref()
    }

    pub fn get(&self, position: &PositionKey, uci: &str) -> Option<Evaluation> {
        if self.position.as_ref() != Some(position) {
            return None;
        }
        self.entries.get(uci).copied()
    }

    /// Returns false (and stores nothing) when `position` is not the cached one.
    pub fn insert(&mut self, position: &PositionKey, uci: &str, evaluation: Evaluation) -> bool {
        if self.position.as_ref() != Some(position) {
            return false;
        }
        self.entries.insert(uci.to_string(), evaluation);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_to_position() {
        let start = PositionKey::startpos();
        let other = PositionKey::new("8/8/8/8/8/8/8/K6k w - - 0 1");

        let mut cache = EvaluationCache::new();
        assert!(!cache.insert(&start, "e2e4", Evaluation::Centipawns(30)));

        cache.reset(Some(start.clone()));
        assert!(cache.insert(&start, "e2e4", Evaluation::Centipawns(30)));
        assert_eq!(cache.get(&start, "e2e4"), Some(Evaluation::Centipawns(30)));
        assert_eq!(cache.get(&other, "e2e4"), None);
        assert!(!cache.insert(&other, "a1a2", Evaluation::Mate(1)));
    }

    #[test]
    fn test_reset_forgets_recurring_moves() {
        let start = PositionKey::startpos();
        let mut cache = EvaluationCache::new();
        cache.reset(Some(start.clone()));
        cache.insert(&start, "g1f3", Evaluation::Centipawns(20));

        let next = PositionKey::new("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
        cache.reset(Some(next.clone()));
        assert!(cache.is_empty());
        assert_eq!(cache.get(&next, "g1f3"), None);
    }
}
