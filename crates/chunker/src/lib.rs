pub mod builder;
pub mod segment;

// Re-export key types
pub use builder::{build, chunk_document, chunk_text, ChunkSet, ChunkStats, SourceDocument};
pub use segment::{segment, segment_with_hints, HeaderHint, TextUnit, UnitKind};
