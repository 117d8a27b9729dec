use std::env;

use serde::{Deserialize, Serialize};

use crate::chunking::{ChunkingConfig, RawChunkingConfig};
use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub chunking: ChunkingConfig,
    pub analysis: AnalysisSettings,
}

/// Analyzer knobs that live outside [`ChunkingConfig`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisSettings {
    /// Platform names requested by default, in catalog spelling.
    pub platforms: Vec<String>,
    pub deep_simulation: bool,
    pub retrieval_seed: u64,
    /// Batch worker threads. 0 = available parallelism.
    pub worker_threads: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            platforms: Vec::new(),
            deep_simulation: false,
            retrieval_seed: 42,
            worker_threads: 0,
        }
    }
}

impl AnalysisSettings {
    /// Resolve worker thread count (0 means use available parallelism).
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            self.worker_threads
        }
    }
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `VECREADY_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let profile = env_opt("VECREADY_PROFILE").unwrap_or_default().to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Result<Self, ConfigError> {
        let p = profile.to_uppercase();
        Self::from_lookup(&p, |key| profiled_env_opt(&p, key))
    }

    /// Build config from an arbitrary key lookup. Unset keys keep defaults.
    pub fn from_lookup<F>(profile: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut raw = RawChunkingConfig::default();
        if let Some(v) = lookup("VECREADY_METHOD") {
            raw.method = v;
        }
        if let Some(v) = lookup("VECREADY_MAX_TOKENS") {
            raw.max_tokens = parse_value("VECREADY_MAX_TOKENS", &v)?;
        }
        if let Some(v) = lookup("VECREADY_OVERLAP_TOKENS") {
            raw.overlap_tokens = parse_value("VECREADY_OVERLAP_TOKENS", &v)?;
        }
        if let Some(v) = lookup("VECREADY_MIN_CHUNK_SIZE") {
            raw.min_chunk_size = parse_value("VECREADY_MIN_CHUNK_SIZE", &v)?;
        }
        if let Some(v) = lookup("VECREADY_PRESERVE_FORMATTING") {
            raw.preserve_formatting = parse_bool("VECREADY_PRESERVE_FORMATTING", &v)?;
        }

        let mut analysis = AnalysisSettings::default();
        if let Some(v) = lookup("VECREADY_PLATFORMS") {
            analysis.platforms = split_list(&v);
        }
        if let Some(v) = lookup("VECREADY_DEEP_SIMULATION") {
            analysis.deep_simulation = parse_bool("VECREADY_DEEP_SIMULATION", &v)?;
        }
        if let Some(v) = lookup("VECREADY_RETRIEVAL_SEED") {
            analysis.retrieval_seed = parse_value("VECREADY_RETRIEVAL_SEED", &v)?;
        }
        if let Some(v) = lookup("VECREADY_WORKER_THREADS") {
            analysis.worker_threads = parse_value("VECREADY_WORKER_THREADS", &v)?;
        }

        Ok(Self {
            profile: profile.to_string(),
            chunking: raw.normalize()?,
            analysis,
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  chunking:  method={}, max_tokens={}, overlap_tokens={}, min_chunk_size={}, preserve_formatting={}",
            self.chunking.method,
            self.chunking.max_tokens,
            self.chunking.overlap_tokens,
            self.chunking.min_chunk_size,
            self.chunking.preserve_formatting
        );
        tracing::info!(
            "  analysis:  platforms=[{}], deep_simulation={}, seed={}, workers={}",
            self.analysis.platforms.join(","),
            self.analysis.deep_simulation,
            self.analysis.retrieval_seed,
            self.analysis.resolved_worker_threads()
        );
    }
}

/// Split a comma-separated list, trimming and dropping empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::chunking::{ChunkingMethod, DEFAULT_MAX_TOKENS};

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = Config::from_lookup("", lookup(&[])).unwrap();
        assert_eq!(cfg.profile_label(), "default");
        assert_eq!(cfg.chunking, ChunkingConfig::default());
        assert_eq!(cfg.analysis, AnalysisSettings::default());
    }

    #[test]
    fn reads_all_keys() {
        let cfg = Config::from_lookup(
            "PROD",
            lookup(&[
                ("VECREADY_METHOD", "token-window"),
                ("VECREADY_MAX_TOKENS", "256"),
                ("VECREADY_OVERLAP_TOKENS", "32"),
                ("VECREADY_MIN_CHUNK_SIZE", "20"),
                ("VECREADY_PRESERVE_FORMATTING", "false"),
                ("VECREADY_PLATFORMS", "pinecone, qdrant,,chroma"),
                ("VECREADY_DEEP_SIMULATION", "yes"),
                ("VECREADY_RETRIEVAL_SEED", "7"),
                ("VECREADY_WORKER_THREADS", "3"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.profile_label(), "PROD");
        assert_eq!(cfg.chunking.method, ChunkingMethod::TokenWindow);
        assert_eq!(cfg.chunking.max_tokens, 256);
        assert_eq!(cfg.chunking.overlap_tokens, 32);
        assert_eq!(cfg.chunking.min_chunk_size, 20);
        assert!(!cfg.chunking.preserve_formatting);
        assert_eq!(cfg.analysis.platforms, vec!["pinecone", "qdrant", "chroma"]);
        assert!(cfg.analysis.deep_simulation);
        assert_eq!(cfg.analysis.retrieval_seed, 7);
        assert_eq!(cfg.analysis.resolved_worker_threads(), 3);
    }

    #[test]
    fn out_of_range_numbers_are_clamped_not_rejected() {
        let cfg = Config::from_lookup("", lookup(&[("VECREADY_MAX_TOKENS", "-1")])).unwrap();
        assert_eq!(cfg.chunking.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = Config::from_lookup("", lookup(&[("VECREADY_MAX_TOKENS", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "VECREADY_MAX_TOKENS"));
        let err = Config::from_lookup("", lookup(&[("VECREADY_METHOD", "bogus")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownMethod(_)));
        let err = Config::from_lookup("", lookup(&[("VECREADY_DEEP_SIMULATION", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
