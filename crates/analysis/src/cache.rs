use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use vecready_core::Chunk;

use crate::analyzer::AnalysisResult;
use crate::platform::{normalize_platforms, profile};

/// Identity of one analysis: the chunk (by id and content digest) plus the
/// sorted, deduplicated list of known platforms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub chunk_id: String,
    pub content_digest: String,
    pub platforms: Vec<String>,
}

impl CacheKey {
    pub fn new<S: AsRef<str>>(chunk: &Chunk, platforms: &[S]) -> Self {
        Self {
            chunk_id: chunk.id.clone(),
            content_digest: format!("{:x}", Sha256::digest(chunk.content.as_bytes())),
            platforms: normalize_platforms(platforms)
                .into_iter()
                .filter(|name| profile(name).is_some())
                .collect(),
        }
    }
}

type Slot = Arc<OnceLock<Arc<AnalysisResult>>>;

/// In-memory memo of analysis results with at-most-one computation per key.
///
/// Concurrent callers for the same key block on the first caller's
/// computation and share its result; distinct keys never wait on each
/// other. Entries live until [`ResultCache::clear`]; there is no eviction.
#[derive(Default)]
pub struct ResultCache {
    slots: RwLock<HashMap<CacheKey, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
    computations: AtomicU64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for `key`, computing it with `compute` on first use.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> Arc<AnalysisResult>
    where
        F: FnOnce() -> AnalysisResult,
    {
        let slot = self.slot(key);
        let mut computed = false;
        let result = slot.get_or_init(|| {
            computed = true;
            self.computations.fetch_add(1, Ordering::Relaxed);
            Arc::new(compute())
        });
        if computed {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        Arc::clone(result)
    }

    /// Look up a finished result without computing.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<AnalysisResult>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).and_then(|slot| slot.get().cloned())
    }

    fn slot(&self, key: CacheKey) -> Slot {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key).or_default())
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        debug!(entries = slots.len(), "clearing analysis cache");
        slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Underlying analyses actually run.
    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits(),
            misses: self.misses(),
            computations: self.computations(),
            hit_rate: self.hit_rate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub computations: u64,
    pub hit_rate: f64,
}
