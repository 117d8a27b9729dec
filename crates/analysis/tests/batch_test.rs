//! Chunk-then-analyze flows through the shared service: cache coalescing,
//! batch ordering, cancellation and statistics.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use vecready_analysis::analyzer::{Priority, RecommendationCategory};
use vecready_analysis::{AnalysisService, AnalyzerOptions, QualityAnalyzer, ReadinessBand};
use vecready_chunker::chunk_text;
use vecready_core::{Chunk, ChunkingConfig, ChunkingMethod};

const ARTICLE: &str = "Vector search finds documents by meaning rather than exact words. \
Each document is split into chunks and every chunk is embedded as a vector. \
At query time the query is embedded the same way and the nearest vectors are returned. \
Chunk size matters because very small chunks lose context while very large chunks blur topics. \
Overlap between chunks keeps sentences that straddle a boundary retrievable from either side. \
Metadata such as the source title and section lets results be filtered and attributed. \
In summary, good chunks are self-contained, focused and sized for the embedding model.";

fn service(threads: usize) -> AnalysisService {
    AnalysisService::new(QualityAnalyzer::new(AnalyzerOptions::default()), threads)
}

fn article_chunks() -> Vec<Chunk> {
    let config = ChunkingConfig::new(ChunkingMethod::SentenceGreedy, 24, 0);
    chunk_text(ARTICLE, &config).chunks
}

#[test]
fn tiny_document_is_flagged_too_small() {
    let set = chunk_text("quick brown fox jumps high", &ChunkingConfig::default());
    assert_eq!(set.chunks.len(), 1);

    let result = service(1).analyze(&set.chunks[0], &["pinecone"]);
    assert!(result.information_density.score < 50);
    assert!(result.embedding_quality.score < 50);
    assert_eq!(result.recommendations[0].title, "Chunk too small");
    assert_eq!(result.recommendations[0].priority, Priority::High);
    assert_eq!(result.status, ReadinessBand::from_score(result.overall_score));
    assert!(result.platform_compatibility.as_ref().unwrap()["pinecone"].score < 70);
}

#[test]
fn concurrent_callers_share_one_computation() {
    let service = service(2);
    let chunk = article_chunks().remove(0);

    let results: Vec<Arc<_>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| service.analyze(&chunk, &["qdrant", "chroma"])))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(service.cache().computations(), 1);
    assert_eq!(service.cache().len(), 1);
    assert_eq!(service.cache().hits() + service.cache().misses(), 8);
    for r in &results[1..] {
        assert!(Arc::ptr_eq(&results[0], r));
    }
}

#[test]
fn platform_order_does_not_split_the_cache() {
    let service = service(1);
    let chunk = article_chunks().remove(0);
    let a = service.analyze(&chunk, &["qdrant", "chroma"]);
    let b = service.analyze(&chunk, &["Chroma", "qdrant"]);
    assert!(Arc::ptr_eq(&a, &b));

    service.analyze(&chunk, &["qdrant"]);
    assert_eq!(service.cache().computations(), 2);
}

#[test]
fn batch_keeps_input_order() {
    let chunks = article_chunks();
    assert!(chunks.len() >= 3);

    let service = service(4);
    let cancel = AtomicBool::new(false);
    let report = service.analyze_batch(&chunks, &["weaviate"], &cancel).unwrap();

    assert!(!report.cancelled);
    let ids: Vec<&str> = report.results.iter().map(|r| r.chunk_id.as_str()).collect();
    let expected: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, expected);
    assert_eq!(report.statistics.chunk_count, chunks.len());
    assert_eq!(report.statistics.analyzed_count, chunks.len());
    assert_eq!(report.statistics.undersized, chunks.len());
}

#[test]
fn repeated_batch_is_served_from_cache() {
    let chunks = article_chunks();
    let service = service(2);
    let cancel = AtomicBool::new(false);

    let first = service.analyze_batch(&chunks, &[] as &[&str], &cancel).unwrap();
    let second = service.analyze_batch(&chunks, &[] as &[&str], &cancel).unwrap();

    assert_eq!(first.results, second.results);
    assert_eq!(service.cache().computations(), chunks.len() as u64);
    assert_eq!(service.cache().hits(), chunks.len() as u64);
}

#[test]
fn cancelled_batch_skips_remaining_chunks() {
    let chunks = article_chunks();
    let service = service(2);
    let cancel = AtomicBool::new(true);

    let report = service.analyze_batch(&chunks, &[] as &[&str], &cancel).unwrap();
    assert!(report.cancelled);
    assert!(report.results.is_empty());
    assert_eq!(report.statistics.analyzed_count, 0);
    assert_eq!(report.statistics.chunk_count, chunks.len());
    assert_eq!(service.cache().computations(), 0);
}

#[test]
fn batch_statistics_surface_common_problems() {
    let chunks = article_chunks();
    let report = service(2)
        .analyze_batch(&chunks, &[] as &[&str], &AtomicBool::new(false))
        .unwrap();
    let stats = &report.statistics;

    let top = &stats.top_categories[0];
    assert_eq!(top.category, RecommendationCategory::Size);
    assert_eq!(top.count, chunks.len());
    assert!(stats.averages.overall > 0.0);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["generatedAt"].is_string());
    assert!(json["statistics"]["statusCounts"]["poor"].is_u64());
}
