//! Status command - report on the published index

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::error::PlannerError;
use crate::search::store::IndexStore;

pub fn run(index: &Path, json: bool) -> Result<()> {
    let store = match IndexStore::open(index) {
        Ok(store) => store,
        Err(PlannerError::IndexUnavailable(path)) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "exists": false,
                        "index": path.display().to_string(),
                    })
                );
            } else {
                println!(
                    "{} Index not found. Run {} first.",
                    "!".yellow().bold(),
                    "wayfinder build".cyan()
                );
            }
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let meta = store.meta()?;
    let embedding_count = store.embedding_count()?;
    let file_size = std::fs::metadata(index).map(|m| m.len()).unwrap_or(0);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "exists": true,
                "destination_count": meta.destination_count,
                "embedding_count": embedding_count,
                "model_id": meta.model_id,
                "embedding_dim": meta.embedding_dim,
                "built_at": meta.built_at,
                "file_size_bytes": file_size,
            })
        );
    } else {
        println!("{}", "Index Status".bold());
        println!();
        println!(
            "  {} {} destinations indexed",
            "→".dimmed(),
            meta.destination_count.to_string().cyan()
        );
        println!(
            "  {} {} embeddings",
            "→".dimmed(),
            embedding_count.to_string().cyan()
        );
        println!(
            "  {} Model: {} (dim {})",
            "→".dimmed(),
            meta.model_id,
            meta.embedding_dim
        );
        println!("  {} Size: {:.2} KB", "→".dimmed(), file_size as f64 / 1024.0);
        let built = chrono::DateTime::from_timestamp(meta.built_at, 0)
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        println!("  {} Built: {}", "→".dimmed(), built);
    }

    Ok(())
}
