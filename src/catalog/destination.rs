use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// One catalog entry. Immutable once loaded for a given index build;
/// `name` doubles as the unique identifier search results are keyed by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default = "default_country")]
    pub country: String,
    pub description: String,
    pub activities: Vec<String>,
    pub scenery: Vec<String>,
    pub amenities: Vec<String>,
    pub best_season: Vec<String>,
    #[serde(default)]
    pub travel_time: Option<String>,
    #[serde(default)]
    pub nearby_attractions: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

fn default_country() -> String {
    "USA".to_string()
}

impl Destination {
    /// True if any of the destination's best seasons matches `season`,
    /// case-insensitively.
    pub fn in_season(&self, season: &str) -> bool {
        self.best_season
            .iter()
            .any(|s| s.eq_ignore_ascii_case(season))
    }
}

/// Load every `*.json` record under `dir`, in lexicographic filename
/// order so repeated builds see the catalog in the same order.
///
/// Fails on an empty directory, an unparseable record, or a duplicate
/// name; a build must never proceed from a partially valid catalog.
pub fn load_catalog(dir: &Path) -> Result<Vec<Destination>> {
    let pattern = dir.join("*.json");
    let mut paths: Vec<_> = glob::glob(&pattern.to_string_lossy())
        .map_err(|e| PlannerError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?
        .filter_map(|entry| entry.ok())
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(PlannerError::EmptyCatalog(dir.to_path_buf()));
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut destinations = Vec::with_capacity(paths.len());

    for path in paths {
        let raw = fs::read_to_string(&path)?;
        let dest: Destination =
            serde_json::from_str(&raw).map_err(|source| PlannerError::MalformedRecord {
                path: path.clone(),
                source,
            })?;

        if !seen.insert(dest.name.clone()) {
            return Err(PlannerError::DuplicateName {
                name: dest.name,
                path,
            });
        }

        destinations.push(dest);
    }

    Ok(destinations)
}
