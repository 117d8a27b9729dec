//! Tests for the chunk builder.

use super::*;
use vecready_core::estimate_tokens;

fn config(method: ChunkingMethod, max: usize, overlap: usize) -> ChunkingConfig {
    ChunkingConfig::new(method, max, overlap)
}

fn normalized(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn sample_document() -> String {
    let mut doc = String::from("Release notes for the storage engine follow.\n\n");
    for (i, topic) in ["Compaction", "Replication", "Recovery"].iter().enumerate() {
        doc.push_str(&format!("## {topic}\n"));
        for p in 0..3 {
            doc.push_str(&format!(
                "The {topic} subsystem changed in step {p}. It now batches writes before flushing them. \
                 However, large batches still wait for the previous flush. Operators can tune this with \
                 the setting number {i}{p}. In summary the defaults are safe.\n\n"
            ));
        }
    }
    doc
}

// ── Edge cases ──────────────────────────────────────────────────────

#[test]
fn empty_and_whitespace_input_produce_no_chunks() {
    for method in ChunkingMethod::ALL {
        let cfg = config(method, 100, 10);
        assert!(chunk_text("", &cfg).chunks.is_empty());
        assert!(chunk_text("  \n\n\t  \n", &cfg).chunks.is_empty());
        assert_eq!(chunk_text("", &cfg).stats, ChunkStats::default());
    }
}

#[test]
fn token_window_over_thousand_words() {
    let text = (0..1000).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
    let set = chunk_text(&text, &config(ChunkingMethod::TokenWindow, 100, 10));

    // 133 words fit 100 tokens; 13 of them fit the 10-token overlap.
    let lower = (1000.0_f64 * 0.75 / 100.0).ceil() as usize;
    assert!(set.chunks.len() >= lower && set.chunks.len() <= lower + 2);
    assert_eq!(set.chunks.len(), 9);
    assert!(set.chunks.iter().all(|c| c.token_count <= 100));
    assert_eq!(set.chunks[0].word_count, 133);

    let expected_overlap = (120..133).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
    assert_eq!(set.chunks[1].overlap_text(), expected_overlap);
    assert!(set.chunks[1].fresh_content().starts_with("word133 "));
}

#[test]
fn ids_and_indices_are_sequential() {
    let text = sample_document();
    let set = chunk_text(&text, &config(ChunkingMethod::SentenceGreedy, 40, 8));
    for (i, chunk) in set.chunks.iter().enumerate() {
        assert_eq!(chunk.index, i);
        assert_eq!(chunk.id, format!("chunk_{:03}", i + 1));
    }
}

// ── Invariants across methods ───────────────────────────────────────

#[test]
fn every_chunk_within_budget() {
    let text = sample_document();
    for method in ChunkingMethod::ALL {
        for (max, overlap) in [(20, 5), (40, 8), (120, 30)] {
            let set = chunk_text(&text, &config(method, max, overlap));
            assert!(!set.chunks.is_empty());
            for chunk in &set.chunks {
                assert!(
                    chunk.token_count <= max,
                    "{method} max={max}: {} has {} tokens",
                    chunk.id,
                    chunk.token_count
                );
                assert_eq!(chunk.token_count, estimate_tokens(&chunk.content));
                assert!(!chunk.overshoot);
            }
        }
    }
}

#[test]
fn fresh_content_reconstructs_source() {
    let text = sample_document();
    for method in ChunkingMethod::ALL {
        for preserve in [true, false] {
            let cfg = config(method, 30, 6).with_preserve_formatting(preserve);
            let set = chunk_text(&text, &cfg);
            let rebuilt = set
                .chunks
                .iter()
                .map(|c| c.fresh_content())
                .collect::<Vec<_>>()
                .join(" ");
            assert_eq!(normalized(&rebuilt), normalized(&text), "{method} preserve={preserve}");

            for chunk in &set.chunks {
                assert_eq!(
                    normalized(&text[chunk.source_range.clone()]),
                    normalized(chunk.fresh_content())
                );
            }
        }
    }
}

#[test]
fn overlap_comes_from_previous_chunk_tail() {
    let text = sample_document();
    for method in ChunkingMethod::ALL {
        let set = chunk_text(&text, &config(method, 40, 10));
        for pair in set.chunks.windows(2) {
            let overlap = pair[1].overlap_text();
            if overlap.is_empty() {
                continue;
            }
            assert!(pair[0].content.ends_with(overlap), "{method}: {overlap:?}");
            assert!(estimate_tokens(overlap) <= 10);
        }
    }
}

#[test]
fn overlap_is_deterministic() {
    let text = sample_document();
    let cfg = config(ChunkingMethod::SemanticBoundary, 35, 10);
    let first = chunk_text(&text, &cfg);
    let second = chunk_text(&text, &cfg);
    assert_eq!(first, second);
    assert!(first.chunks.iter().skip(1).any(|c| c.overlap_length > 0));
}

#[test]
fn zero_overlap_carries_nothing() {
    let text = sample_document();
    let set = chunk_text(&text, &config(ChunkingMethod::SentenceGreedy, 30, 0));
    assert!(set.chunks.iter().all(|c| c.overlap_length == 0));
}

// ── Method-specific behavior ────────────────────────────────────────

#[test]
fn section_aware_one_chunk_per_header() {
    let text = "# Alpha\nAlpha body text.\n\n# Beta\nBeta body text.\n\n# Gamma\nGamma body.\n\n# Delta\nDelta body.";
    let set = chunk_text(text, &config(ChunkingMethod::SectionAware, 512, 50));
    assert_eq!(set.chunks.len(), 4);
    for (chunk, name) in set.chunks.iter().zip(["Alpha", "Beta", "Gamma", "Delta"]) {
        assert!(chunk.content.starts_with(&format!("# {name}")));
        assert_eq!(chunk.section_heading.as_deref(), Some(name));
        assert_eq!(chunk.overlap_length, 0);
    }
}

#[test]
fn section_aware_keeps_subsections_with_their_parent() {
    let text = "# Alpha\n## Alpha details\nAlpha body text.\n\n# Beta\n## Beta details\nBeta body text.\n\n\
                # Gamma\nGamma body.\n\n# Delta\nDelta body.";
    let set = chunk_text(text, &config(ChunkingMethod::SectionAware, 512, 50));
    assert_eq!(set.chunks.len(), 4);
    for (chunk, name) in set.chunks.iter().zip(["Alpha", "Beta", "Gamma", "Delta"]) {
        assert!(chunk.content.starts_with(&format!("# {name}\n")));
        assert_eq!(chunk.section_heading.as_deref(), Some(name));
        assert!(chunk.content.contains(&format!("{name} body")));
        assert_ne!(chunk.content, format!("# {name}"));
    }
    assert!(set.chunks[0].content.contains("## Alpha details"));
    assert!(set.chunks[1].content.contains("## Beta details"));
}

#[test]
fn section_aware_never_overlaps_across_sections() {
    let mut text = String::from("# One\nShort intro here.\n\n# Two\n");
    for i in 0..10 {
        text.push_str(&format!("Sentence number {i} talks about the second topic. "));
    }
    let set = chunk_text(&text, &config(ChunkingMethod::SectionAware, 30, 5));

    assert_eq!(set.chunks[0].content, "# One\nShort intro here.");
    assert!(set.chunks[1].content.starts_with("# Two"));
    assert_eq!(set.chunks[1].overlap_length, 0);
    assert!(set.chunks.len() > 2);
    for chunk in &set.chunks[1..] {
        assert_eq!(chunk.section_heading.as_deref(), Some("Two"));
        assert!(!chunk.content.contains("intro"));
        assert!(chunk.token_count <= 30);
    }
}

#[test]
fn semantic_boundary_cuts_before_contrast() {
    let text = "Cats purr softly. Cats sleep all day. However dogs bark loudly. Dogs run fast. Dogs dig holes.";

    let greedy = chunk_text(text, &config(ChunkingMethod::SentenceGreedy, 12, 0));
    assert_eq!(greedy.chunks.len(), 2);
    assert!(greedy.chunks[0].content.ends_with("Dogs run fast."));

    let semantic = chunk_text(text, &config(ChunkingMethod::SemanticBoundary, 12, 0));
    assert_eq!(semantic.chunks.len(), 2);
    assert_eq!(semantic.chunks[0].content, "Cats purr softly. Cats sleep all day.");
    assert_eq!(
        semantic.chunks[1].content,
        "However dogs bark loudly. Dogs run fast. Dogs dig holes."
    );
}

#[test]
fn unsplittable_word_is_emitted_alone() {
    let text = "Short words here. https://example.com/a/very/long/path/with/many/segments?q=1&x=2";
    let set = chunk_text(text, &config(ChunkingMethod::TokenWindow, 3, 1));

    assert_eq!(set.chunks.len(), 2);
    assert_eq!(set.chunks[0].content, "Short words here.");
    let big = &set.chunks[1];
    assert!(big.overshoot);
    assert_eq!(big.word_count, 1);
    assert_eq!(big.overlap_length, 0);
    assert!(big.token_count > 3);
    assert_eq!(set.stats.overshoot_count, 1);
}

// ── Formatting and document pass-through ────────────────────────────

#[test]
fn formatting_preserved_or_collapsed() {
    let text = "First   line\nwith  breaks.\n\nSecond paragraph   here.";

    let kept = chunk_text(text, &config(ChunkingMethod::SentenceGreedy, 512, 50));
    assert_eq!(kept.chunks[0].content, text);

    let collapsed_cfg = config(ChunkingMethod::SentenceGreedy, 512, 50).with_preserve_formatting(false);
    let collapsed = chunk_text(text, &collapsed_cfg);
    assert_eq!(
        collapsed.chunks[0].content,
        "First line with breaks.\n\nSecond paragraph here."
    );
}

#[test]
fn document_tags_metadata_and_hints_reach_chunks() {
    let mut meta = SourceMetadata::new();
    meta.insert("title".into(), serde_json::json!("Quarterly report"));
    let doc = SourceDocument::new("Overview\nRevenue grew steadily.\n\nOutlook\nDemand stays strong.")
        .with_headers(vec![HeaderHint::new("Overview", 1), HeaderHint::new("Outlook", 1)])
        .with_tags(["finance", "q3"])
        .with_metadata(meta.clone());

    let set = chunk_document(&doc, &config(ChunkingMethod::SectionAware, 512, 50));
    assert_eq!(set.chunks.len(), 2);
    assert_eq!(set.chunks[1].section_heading.as_deref(), Some("Outlook"));
    for chunk in &set.chunks {
        assert_eq!(chunk.tags, vec!["finance", "q3"]);
        assert_eq!(chunk.source_metadata.as_ref(), Some(&meta));
    }
}

#[test]
fn stats_summarize_the_run() {
    let text = sample_document();
    let set = chunk_text(&text, &config(ChunkingMethod::SentenceGreedy, 40, 8).with_min_chunk_size(25));
    let stats = &set.stats;
    assert_eq!(stats.chunk_count, set.chunks.len());
    assert_eq!(stats.total_tokens, set.chunks.iter().map(|c| c.token_count).sum::<usize>());
    assert!(stats.min_tokens <= stats.max_tokens);
    assert!(stats.max_tokens <= 40);
    assert_eq!(
        stats.under_min_size,
        set.chunks.iter().filter(|c| c.word_count < 25).count()
    );
}
