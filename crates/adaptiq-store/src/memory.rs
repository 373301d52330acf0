//! In-process proficiency store.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use adaptiq_core::error::StoreError;
use adaptiq_core::traits::{check_level, ProficiencyStore};

/// Keeps levels in a concurrent map for the lifetime of the process.
///
/// Counts reads and writes so tests can observe how the tracker uses it.
#[derive(Default)]
pub struct MemoryStore {
    levels: DashMap<String, f64>,
    gets: AtomicU64,
    puts: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with levels.
    pub fn with_levels<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let store = Self::new();
        for (id, level) in levels {
            store.levels.insert(id.into(), level);
        }
        store
    }

    pub fn get_count(&self) -> u64 {
        self.gets.load(Ordering::Relaxed)
    }

    pub fn put_count(&self) -> u64 {
        self.puts.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl ProficiencyStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, learner_id: &str) -> Result<Option<f64>, StoreError> {
        self.gets.fetch_add(1, Ordering::Relaxed);
        Ok(self.levels.get(learner_id).map(|l| *l))
    }

    fn put(&self, learner_id: &str, level: f64) -> Result<(), StoreError> {
        check_level(learner_id, level)?;
        self.puts.fetch_add(1, Ordering::Relaxed);
        self.levels.insert(learner_id.to_string(), level);
        Ok(())
    }

    fn learners(&self) -> Result<Vec<String>, StoreError> {
        let mut ids: Vec<String> = self.levels.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }
}
