//! Index Builder: catalog in, published aspect indices out.
//!
//! A build either publishes a complete index or nothing. Embeddings for
//! every destination and aspect are computed up front; the store is
//! written at a temporary path and renamed over the target only once
//! every row is committed, so a reader can never observe an index where
//! a destination is present in one aspect index and missing from
//! another.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::catalog::{load_catalog, Destination};
use crate::error::{PlannerError, Result};
use crate::search::aspect::Aspect;
use crate::search::embedding::{EmbeddingModel, EMBEDDING_DIM, MODEL_ID};
use crate::search::store::{IndexEntry, IndexMeta, IndexStore};

#[derive(Debug)]
pub struct BuildSummary {
    pub destinations: usize,
    pub embeddings: usize,
    pub duration_ms: u128,
}

/// Derive the text embedded for one aspect of a destination.
///
/// The exact composition and ordering is part of the index contract:
/// repeated builds of the same catalog must produce identical text, or
/// embeddings drift for no semantic reason.
pub fn aspect_text(destination: &Destination, aspect: Aspect) -> String {
    let parts: Vec<&str> = match aspect {
        // What you can do there, anchored by the description.
        Aspect::Activities => std::iter::once(destination.description.as_str())
            .chain(destination.activities.iter().map(String::as_str))
            .chain(destination.nearby_attractions.iter().map(String::as_str))
            .collect(),
        Aspect::Scenery => destination
            .scenery
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(destination.description.as_str()))
            .collect(),
        Aspect::Amenities => destination
            .amenities
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(destination.description.as_str()))
            .collect(),
        // Geographic context: place names plus free-form keywords.
        Aspect::Location => std::iter::once(destination.location.as_str())
            .chain(destination.state.as_deref())
            .chain(std::iter::once(destination.country.as_str()))
            .chain(destination.keywords.iter().map(String::as_str))
            .collect(),
    };

    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build and atomically publish the index for every record in
/// `catalog_dir`. Any failure aborts the build with nothing published.
pub fn build_index(
    catalog_dir: &Path,
    index_path: &Path,
    model: &EmbeddingModel,
) -> Result<BuildSummary> {
    let start = Instant::now();

    let catalog = load_catalog(catalog_dir)?;

    let mut entries = Vec::with_capacity(catalog.len());
    for destination in catalog {
        let mut embeddings = Vec::with_capacity(Aspect::ALL.len());
        for aspect in Aspect::ALL {
            let text = aspect_text(&destination, aspect);
            let embedding =
                model
                    .embed(&text)
                    .map_err(|source| PlannerError::Embedding {
                        context: format!("{} ({})", destination.name, aspect),
                        source,
                    })?;
            embeddings.push((aspect, embedding));
        }
        entries.push(IndexEntry {
            destination,
            embeddings,
        });
    }

    let meta = IndexMeta {
        model_id: MODEL_ID.to_string(),
        embedding_dim: EMBEDDING_DIM,
        destination_count: entries.len(),
        built_at: chrono::Utc::now().timestamp(),
    };

    publish(index_path, &entries, &meta)?;

    Ok(BuildSummary {
        destinations: entries.len(),
        embeddings: entries.len() * Aspect::ALL.len(),
        duration_ms: start.elapsed().as_millis(),
    })
}

/// Write the store at `<index_path>.tmp`, then rename into place.
fn publish(index_path: &Path, entries: &[IndexEntry], meta: &IndexMeta) -> Result<()> {
    if let Some(parent) = index_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = staging_path(index_path);
    if tmp_path.exists() {
        fs::remove_file(&tmp_path)?;
    }

    let mut store = IndexStore::create(&tmp_path)?;
    store.write_all(entries, meta)?;
    drop(store);

    fs::rename(&tmp_path, index_path)?;
    Ok(())
}

fn staging_path(index_path: &Path) -> PathBuf {
    let mut name = index_path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
