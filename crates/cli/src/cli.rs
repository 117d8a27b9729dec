use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use vecready_core::{ChunkingConfig, ConfigError, RawChunkingConfig};

/// Chunk documents and score how ready the chunks are for vector embedding.
///
/// Defaults come from `VECREADY_*` environment variables (and `.env`);
/// flags override them for a single run.
#[derive(Parser, Debug)]
#[command(name = "vecready", version, about = "Chunking and vector-readiness analysis")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a text file into chunks
    Chunk {
        /// Input text file
        file: PathBuf,

        #[command(flatten)]
        chunking: ChunkingArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Chunk a text file, then analyze every chunk
    Analyze {
        /// Input text file
        file: PathBuf,

        #[command(flatten)]
        chunking: ChunkingArgs,

        /// Platforms to assess (comma separated, overrides VECREADY_PLATFORMS)
        #[arg(long, value_delimiter = ',')]
        platforms: Option<Vec<String>>,

        /// Blend simulated embedding statistics into the scores
        #[arg(long)]
        deep: bool,
    },

    /// Print the platform catalog
    Platforms,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

/// Per-run overrides of the chunking config.
#[derive(Args, Debug, Default)]
pub struct ChunkingArgs {
    /// semantic-boundary, token-window, sentence-greedy or section-aware
    #[arg(long)]
    pub method: Option<String>,

    /// Token budget per chunk
    #[arg(long)]
    pub max_tokens: Option<i64>,

    /// Tokens carried over from the previous chunk
    #[arg(long)]
    pub overlap_tokens: Option<i64>,

    /// Soft minimum chunk size in words (reported, not enforced)
    #[arg(long)]
    pub min_chunk_size: Option<i64>,

    /// Collapse whitespace instead of keeping source formatting
    #[arg(long)]
    pub no_preserve_formatting: bool,

    /// Tags attached to every chunk (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

impl ChunkingArgs {
    /// Layer these flags over `base` and renormalize the result.
    pub fn apply(&self, base: &ChunkingConfig) -> Result<ChunkingConfig, ConfigError> {
        let raw = RawChunkingConfig {
            method: self
                .method
                .clone()
                .unwrap_or_else(|| base.method.as_str().to_string()),
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens as i64),
            overlap_tokens: self.overlap_tokens.unwrap_or(base.overlap_tokens as i64),
            min_chunk_size: self.min_chunk_size.unwrap_or(base.min_chunk_size as i64),
            preserve_formatting: base.preserve_formatting && !self.no_preserve_formatting,
        };
        raw.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vecready_core::ChunkingMethod;

    #[test]
    fn no_flags_keep_the_base_config() {
        let base = ChunkingConfig::new(ChunkingMethod::SectionAware, 300, 30);
        assert_eq!(ChunkingArgs::default().apply(&base).unwrap(), base);
    }

    #[test]
    fn flags_override_and_renormalize() {
        let args = ChunkingArgs {
            method: Some("token-window".into()),
            max_tokens: Some(100),
            overlap_tokens: Some(500),
            no_preserve_formatting: true,
            ..ChunkingArgs::default()
        };
        let config = args.apply(&ChunkingConfig::default()).unwrap();
        assert_eq!(config.method, ChunkingMethod::TokenWindow);
        assert_eq!(config.max_tokens, 100);
        assert_eq!(config.overlap_tokens, 99);
        assert!(!config.preserve_formatting);
    }

    #[test]
    fn unknown_method_flag_is_an_error() {
        let args = ChunkingArgs {
            method: Some("by-vibes".into()),
            ..ChunkingArgs::default()
        };
        assert!(args.apply(&ChunkingConfig::default()).is_err());
    }

    #[test]
    fn parses_analyze_command() {
        let args = CliArgs::parse_from([
            "vecready", "analyze", "doc.md", "--platforms", "pinecone,qdrant", "--deep", "--tags", "a,b",
        ]);
        match args.command {
            Command::Analyze { file, chunking, platforms, deep } => {
                assert_eq!(file, PathBuf::from("doc.md"));
                assert_eq!(platforms.unwrap(), vec!["pinecone", "qdrant"]);
                assert!(deep);
                assert_eq!(chunking.tags, vec!["a", "b"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
