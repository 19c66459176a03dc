//! Human-readable output for `vectorize` and `inspect`.

use std::fmt::Write;
use std::path::PathBuf;

use titlecat_ai::{Pipeline, Token, Vectorized};

/// Facts about the language model that the pipeline no longer exposes once
/// it owns the tokenizer.
pub struct ModelStats {
    pub model_dir: PathBuf,
    pub classifier: PathBuf,
    pub dim: usize,
    pub vocab: usize,
    pub stopwords: usize,
}

// ── Public API ──

pub fn print_tokens(tokens: &[Token<'_>], vectorized: &Vectorized) {
    print!("{}", render_tokens(tokens, vectorized));
}

pub fn print_inspect(stats: &ModelStats, pipeline: &Pipeline) {
    print!("{}", render_inspect(stats, pipeline));
}

// ── Rendering ──

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

fn render_tokens(tokens: &[Token<'_>], vectorized: &Vectorized) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<20} {:<5} {:<5} {:<5} {}", "token", "stop", "punct", "known", "used");
    for t in tokens {
        let _ = writeln!(
            out,
            "{:<20} {:<5} {:<5} {:<5} {}",
            t.text,
            yes_no(t.is_stop),
            yes_no(t.is_punct),
            yes_no(t.has_vector()),
            yes_no(t.qualifies()),
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "  {:<12} {}", "dim", vectorized.vector.dim());
    let _ = writeln!(out, "  {:<12} {}", "qualifying", vectorized.qualifying);
    if vectorized.vector.is_zero() {
        let _ = writeln!(out, "  {:<12} {}", "vector", "zero (fallback)");
    }
    out
}

fn render_inspect(stats: &ModelStats, pipeline: &Pipeline) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Language model");
    let _ = writeln!(out, "  {:<12} {}", "directory", stats.model_dir.display());
    let _ = writeln!(out, "  {:<12} {}", "dim", stats.dim);
    let _ = writeln!(out, "  {:<12} {}", "vocabulary", stats.vocab);
    let _ = writeln!(out, "  {:<12} {}", "stopwords", stats.stopwords);
    let _ = writeln!(out);

    let summary = pipeline.labels().summary();
    let _ = writeln!(out, "Classifier");
    let _ = writeln!(out, "  {:<12} {}", "artifact", stats.classifier.display());
    let _ = writeln!(out, "  {:<12} {}", "kind", pipeline.classifier_kind());
    let _ = writeln!(
        out,
        "  {:<12} {} ({} text, {} numeric)",
        "labels", summary.total, summary.text, summary.numeric
    );
    let _ = writeln!(out, "  {:<12} {}", "fallback", pipeline.fallback_label());
    let _ = writeln!(out);

    let _ = writeln!(out, "Labels");
    for label in pipeline.labels().iter() {
        let _ = writeln!(out, "  {label}");
    }
    out
}
