//! Translation result cache
//!
//! One entry per (source, target, text). Entries never expire and are never
//! replaced; only [`TranslationCache::clear`] drops them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::core::models::{Language, TranslationResult};

/// Source tag used when the provider detects the language
pub const AUTO_SOURCE: &str = "auto";

/// Exact-match cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source: String,
    pub target: String,
    pub text: String,
}

impl CacheKey {
    pub fn new(source: Option<&Language>, target: &Language, text: &str) -> Self {
        Self {
            source: source.map(Language::tag).unwrap_or_else(|| AUTO_SOURCE.to_string()),
            target: target.tag(),
            text: text.to_string(),
        }
    }
}

/// A stored result
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: TranslationResult,
    pub cached_at: DateTime<Utc>,
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Shared, clonable cache handle
#[derive(Debug, Clone, Default)]
pub struct TranslationCache {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
    counters: Arc<Counters>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &CacheKey) -> Option<TranslationResult> {
        let found = {
            let entries = self.entries.read().await;
            entries.get(key).map(|entry| entry.result.clone())
        };

        match found {
            Some(result) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit for {} -> {}", key.source, key.target);
                Some(result)
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `result` unless the key is already present.
    ///
    /// Returns `false` when an earlier entry was kept.
    pub async fn put(&self, key: CacheKey, result: TranslationResult) -> bool {
        let mut entries = self.entries.write().await;
        if entries.contains_key(&key) {
            return false;
        }
        entries.insert(
            key,
            CacheEntry {
                result,
                cached_at: Utc::now(),
            },
        );
        true
    }

    /// Stored entry with its timestamp
    pub async fn entry(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every entry and reset the counters
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        self.counters.hits.store(0, Ordering::Relaxed);
        self.counters.misses.store(0, Ordering::Relaxed);
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len().await,
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
        }
    }
}
