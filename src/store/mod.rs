//! Persistence of computed scores.
//!
//! Ranking itself never touches storage; the service hands finished scores
//! to a [`ScoreStore`] when persistence is enabled.

pub mod sqlite;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::{Result, StoredScore};

pub use sqlite::SqliteScoreStore;

#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Insert or replace the score for `score.address`.
    async fn save(&self, score: &StoredScore) -> Result<()>;

    async fn load(&self, address: &str) -> Result<Option<StoredScore>>;

    /// Highest scores first; ties broken by address.
    async fn leaderboard(&self, limit: usize) -> Result<Vec<StoredScore>>;
}

/// Process-local store, mostly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    scores: RwLock<HashMap<String, StoredScore>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Every write is a single insert, so a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, StoredScore>> {
        self.scores.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, StoredScore>> {
        self.scores.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ScoreStore for MemoryScoreStore {
    async fn save(&self, score: &StoredScore) -> Result<()> {
        self.write().insert(score.address.to_lowercase(), score.clone());
        Ok(())
    }

    async fn load(&self, address: &str) -> Result<Option<StoredScore>> {
        Ok(self.read().get(&address.to_lowercase()).cloned())
    }

    async fn leaderboard(&self, limit: usize) -> Result<Vec<StoredScore>> {
        let mut all: Vec<StoredScore> = self.read().values().cloned().collect();

        all.sort_by(|a, b| {
            b.total_points
                .total_cmp(&a.total_points)
                .then_with(|| a.address.cmp(&b.address))
        });
        all.truncate(limit);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityStats, Rank};
    use chrono::Utc;

    fn score(address: &str, points: f64) -> StoredScore {
        StoredScore {
            address: address.to_string(),
            total_points: points,
            rank: Rank::from_points(points),
            stats: ActivityStats::default(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_upsert_and_leaderboard() {
        let store = MemoryScoreStore::new();
        store.save(&score("0xb", 100.0)).await.unwrap();
        store.save(&score("0xa", 100.0)).await.unwrap();
        store.save(&score("0xc", 5_000.0)).await.unwrap();
        store.save(&score("0xB", 50.0)).await.unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.load("0xb").await.unwrap().unwrap().total_points, 50.0);

        let top: Vec<String> = store
            .leaderboard(2)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.address)
            .collect();
        assert_eq!(top, vec!["0xc", "0xa"]);
    }

    #[tokio::test]
    async fn test_memory_store_survives_poisoned_lock() {
        let store = MemoryScoreStore::new();
        std::thread::scope(|scope| {
            let handle = scope.spawn(|| {
                let _guard = store.scores.write().unwrap();
                panic!("writer died");
            });
            assert!(handle.join().is_err());
        });
        assert!(store.scores.is_poisoned());

        store.save(&score("0xa", 10.0)).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.load("0xA").await.unwrap().unwrap().total_points, 10.0);
    }
}
