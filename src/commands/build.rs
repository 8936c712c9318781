//! Build command - embed the catalog and publish the index

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::search::embedding::EmbeddingModel;
use crate::search::index::build_index;

pub fn run(catalog: &Path, index: &Path, json: bool) -> Result<()> {
    let model = EmbeddingModel::new();

    if !json {
        println!(
            "{} Building destination index from {}...",
            "→".dimmed(),
            catalog.display()
        );
    }

    let summary = build_index(catalog, index, &model)?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "destinations": summary.destinations,
                "embeddings": summary.embeddings,
                "duration_ms": summary.duration_ms,
                "index": index.display().to_string(),
            })
        );
    } else {
        println!(
            "{} Indexed {} destinations ({} embeddings) in {:.2}s",
            "✓".green().bold(),
            summary.destinations.to_string().cyan(),
            summary.embeddings,
            summary.duration_ms as f64 / 1000.0
        );
        println!("  {} Index saved to: {}", "→".dimmed(), index.display());
    }

    Ok(())
}
