pub mod chunk;
pub mod chunking;
pub mod config;
pub mod error;
pub mod lexicon;
pub mod tokens;

pub use chunk::{chunk_id, Chunk, SourceMetadata};
pub use chunking::{ChunkingConfig, ChunkingMethod, RawChunkingConfig};
pub use config::Config;
pub use error::*;
pub use tokens::{estimate_tokens, TokenTally};
