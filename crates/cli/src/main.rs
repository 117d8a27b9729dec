mod cli;

use std::path::Path;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use vecready_analysis::platform::CATALOG_VERSION;
use vecready_analysis::{AnalysisService, PLATFORMS};
use vecready_chunker::{chunk_document, ChunkSet, SourceDocument};
use vecready_core::{Chunk, Config, SourceMetadata};

use crate::cli::{ChunkingArgs, CliArgs, Command, OutputFormat};

const PREVIEW_CHARS: usize = 60;

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    vecready_core::config::load_dotenv();
    let config = Config::from_env().context("failed to load configuration")?;
    config.log_summary();

    match args.command {
        Command::Chunk { file, chunking, format } => {
            let set = chunk_file(&file, &chunking, &config)?;
            match format {
                OutputFormat::Json => print_json(&set)?,
                OutputFormat::Table => print_table(&set.chunks),
            }
        }
        Command::Analyze {
            file,
            chunking,
            platforms,
            deep,
        } => {
            let set = chunk_file(&file, &chunking, &config)?;
            let platforms = platforms.unwrap_or_else(|| config.analysis.platforms.clone());

            let mut settings = config.analysis.clone();
            settings.deep_simulation |= deep;
            let service = AnalysisService::from_settings(&settings);

            let cancel = AtomicBool::new(false);
            let report = service
                .analyze_batch(&set.chunks, platforms.as_slice(), &cancel)
                .context("batch analysis failed")?;
            info!(
                chunks = report.statistics.analyzed_count,
                average = format!("{:.1}", report.statistics.averages.overall),
                "analysis complete"
            );
            print_json(&report)?;
        }
        Command::Platforms => {
            print_json(&serde_json::json!({
                "version": CATALOG_VERSION,
                "platforms": PLATFORMS,
            }))?;
        }
    }

    Ok(())
}

fn chunk_file(path: &Path, args: &ChunkingArgs, config: &Config) -> Result<ChunkSet> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let chunking = args
        .apply(&config.chunking)
        .context("invalid chunking options")?;

    let mut metadata = SourceMetadata::new();
    metadata.insert("source".into(), path.display().to_string().into());
    if let Some(title) = path.file_stem().and_then(|s| s.to_str()) {
        metadata.insert("title".into(), title.into());
    }
    let doc = SourceDocument::new(text)
        .with_tags(args.tags.iter().cloned())
        .with_metadata(metadata);

    Ok(chunk_document(&doc, &chunking))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn print_table(chunks: &[Chunk]) {
    println!("{:<12} {:>7} {:>7}  {}", "ID", "TOKENS", "WORDS", "PREVIEW");
    for chunk in chunks {
        let flat = chunk.fresh_content().split_whitespace().collect::<Vec<_>>().join(" ");
        let mut preview: String = flat.chars().take(PREVIEW_CHARS).collect();
        if flat.chars().count() > PREVIEW_CHARS {
            preview.push_str("...");
        }
        println!(
            "{:<12} {:>7} {:>7}  {}",
            chunk.id, chunk.token_count, chunk.word_count, preview
        );
    }
}
