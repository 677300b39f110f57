// src/storage.rs
//! Corpus collaborator used by duplicate detection. The on-disk format and
//! partitioning live outside this core; gates only need read access to the
//! current day's partition.

use std::collections::HashSet;

use crate::similarity;

/// Read-only view of the already-persisted article corpus, scoped to the
/// current partition.
pub trait CorpusStore: Send + Sync {
    /// Exact content-hash membership test.
    fn hash_exists(&self, content_hash: &str) -> bool;

    /// Existing titles whose similarity ratio against `title` meets
    /// `threshold`, in corpus order.
    fn find_similar_titles(&self, title: &str, threshold: f64) -> Vec<String>;
}

/// In-memory corpus for tests and local wiring.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCorpus {
    hashes: HashSet<String>,
    titles: Vec<String>,
}

impl InMemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, content_hash: impl Into<String>, title: impl Into<String>) {
        self.hashes.insert(content_hash.into());
        self.titles.push(title.into());
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

impl CorpusStore for InMemoryCorpus {
    fn hash_exists(&self, content_hash: &str) -> bool {
        self.hashes.contains(content_hash)
    }

    fn find_similar_titles(&self, title: &str, threshold: f64) -> Vec<String> {
        self.titles
            .iter()
            .filter(|t| similarity::similarity_ratio(title, t) >= threshold)
            .cloned()
            .collect()
    }
}
