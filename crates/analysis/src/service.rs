//! Batch analysis service: a shared analyzer and result cache driven by a
//! dedicated rayon pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vecready_core::config::AnalysisSettings;
use vecready_core::{Chunk, VecreadyError};

use crate::analyzer::{AnalysisResult, AnalyzerOptions, QualityAnalyzer};
use crate::cache::{CacheKey, ResultCache};
use crate::stats::BatchStatistics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Results of the chunks that completed, in input order.
    pub results: Vec<AnalysisResult>,
    pub cancelled: bool,
    pub statistics: BatchStatistics,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AnalysisService {
    analyzer: Arc<QualityAnalyzer>,
    cache: Arc<ResultCache>,
    worker_threads: usize,
}

impl AnalysisService {
    /// `worker_threads` of 0 means available parallelism.
    pub fn new(analyzer: QualityAnalyzer, worker_threads: usize) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            cache: Arc::new(ResultCache::new()),
            worker_threads,
        }
    }

    pub fn from_settings(settings: &AnalysisSettings) -> Self {
        Self::new(
            QualityAnalyzer::new(AnalyzerOptions::from(settings)),
            settings.resolved_worker_threads(),
        )
    }

    pub fn analyzer(&self) -> &QualityAnalyzer {
        &self.analyzer
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Analyze one chunk through the cache.
    pub fn analyze<S: AsRef<str>>(&self, chunk: &Chunk, platforms: &[S]) -> Arc<AnalysisResult> {
        let key = CacheKey::new(chunk, platforms);
        self.cache
            .get_or_compute(key, || self.analyzer.analyze(chunk, platforms))
    }

    /// Analyze `chunks` in parallel. `cancel` is checked before each chunk;
    /// chunks already running finish, the rest are skipped and the report
    /// is marked cancelled.
    pub fn analyze_batch<S>(
        &self,
        chunks: &[Chunk],
        platforms: &[S],
        cancel: &AtomicBool,
    ) -> Result<BatchReport, VecreadyError>
    where
        S: AsRef<str> + Sync,
    {
        let threads = if self.worker_threads == 0 {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
        } else {
            self.worker_threads
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("vecready-analysis-{i}"))
            .build()
            .map_err(|e| VecreadyError::Other(format!("failed to build analysis pool: {e}")))?;

        let outcomes: Vec<Option<Arc<AnalysisResult>>> = pool.install(|| {
            chunks
                .par_iter()
                .map(|chunk| {
                    if cancel.load(Ordering::Relaxed) {
                        None
                    } else {
                        Some(self.analyze(chunk, platforms))
                    }
                })
                .collect()
        });

        let cancelled = outcomes.iter().any(Option::is_none);
        let completed: Vec<(&Chunk, Arc<AnalysisResult>)> = chunks
            .iter()
            .zip(outcomes)
            .filter_map(|(chunk, outcome)| outcome.map(|r| (chunk, r)))
            .collect();

        let statistics =
            BatchStatistics::from_analyzed(completed.iter().map(|(c, r)| (*c, &**r)), chunks.len());

        if cancelled {
            info!(
                completed = completed.len(),
                total = chunks.len(),
                "batch analysis cancelled"
            );
        }
        let cache = self.cache.stats();
        debug!(
            entries = cache.entries,
            hits = cache.hits,
            misses = cache.misses,
            hit_rate = cache.hit_rate,
            "analysis cache"
        );

        Ok(BatchReport {
            results: completed.into_iter().map(|(_, r)| (*r).clone()).collect(),
            cancelled,
            statistics,
            generated_at: Utc::now(),
        })
    }
}
