pub mod analyzer;
pub mod cache;
pub mod embedding;
pub mod platform;
pub mod retrieval;
pub mod service;
pub mod stats;
mod text;

// Re-export key types
pub use analyzer::{AnalysisResult, AnalyzerOptions, QualityAnalyzer, ReadinessBand, ScoringThresholds, ScoringWeights};
pub use cache::{CacheKey, CacheStats, ResultCache};
pub use platform::{assess_platforms, PlatformAssessment, PlatformProfile, PLATFORMS};
pub use retrieval::{RetrievalSimulation, RetrievalSimulator};
pub use service::{AnalysisService, BatchReport};
pub use stats::BatchStatistics;
