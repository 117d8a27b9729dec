use thiserror::Error;

/// Invalid configuration shapes, rejected before any chunking begins.
///
/// Out-of-range numeric values are clamped by normalization instead and
/// never surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown chunking method '{0}' (expected one of: semantic-boundary, token-window, sentence-greedy, section-aware)")]
    UnknownMethod(String),

    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum VecreadyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

