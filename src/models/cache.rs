use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::models::WalletReport;

/// Cache entry with TTL
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// In-memory cache of wallet reports, keyed by lower-cased address.
#[derive(Debug, Clone)]
pub struct RankingCache {
    reports: Arc<RwLock<HashMap<String, CacheEntry<WalletReport>>>>,
    ttl: Duration,
    max_entries: usize,
}

impl Default for RankingCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(300), 10_000)
    }
}

impl RankingCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            reports: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            max_entries,
        }
    }

    pub fn get(&self, address: &str) -> Option<WalletReport> {
        let cache = self.reports.read().ok()?;
        let entry = cache.get(&CacheKey::report(address))?;

        if entry.is_expired() {
            return None;
        }

        Some(entry.value.clone())
    }

    pub fn insert(&self, report: WalletReport) {
        if self.max_entries == 0 {
            return;
        }

        if let Ok(mut cache) = self.reports.write() {
            let key = CacheKey::report(&report.address);

            if !cache.contains_key(&key) && cache.len() >= self.max_entries {
                cache.retain(|_, entry| !entry.is_expired());

                if cache.len() >= self.max_entries {
                    let oldest = cache
                        .iter()
                        .min_by_key(|(_, entry)| entry.created_at)
                        .map(|(k, _)| k.clone());
                    if let Some(oldest) = oldest {
                        cache.remove(&oldest);
                    }
                }
            }

            cache.insert(key, CacheEntry::new(report, self.ttl));
        }
    }

    pub fn invalidate(&self, address: &str) {
        if let Ok(mut cache) = self.reports.write() {
            cache.remove(&CacheKey::report(address));
        }
    }

    /// Clean up expired entries
    pub fn cleanup_expired(&self) {
        if let Ok(mut cache) = self.reports.write() {
            cache.retain(|_, entry| !entry.is_expired());
        }
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.reports.write() {
            cache.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        let (total, expired) = self
            .reports
            .read()
            .map(|c| (c.len(), c.values().filter(|e| e.is_expired()).count()))
            .unwrap_or((0, 0));

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            max_entries: self.max_entries,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub max_entries: usize,
}

pub struct CacheKey;

impl CacheKey {
    pub fn report(address: &str) -> String {
        format!("report:{}", address.to_lowercase())
    }
}
