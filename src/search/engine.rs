//! Query engine: exhaustive multi-aspect scoring over a published index.
//!
//! Every aspect index is scanned in full for every query. Truncating to
//! a per-aspect top-k before weighting would let a destination's strong
//! showing in a low-weighted aspect push it out of the candidate set
//! before the weights get a say; the full scan keeps weight changes
//! able to alter which destinations qualify, not just their order.

use std::path::Path;

use regex::RegexBuilder;
use serde::Serialize;

use crate::catalog::{infer_budget, BudgetTier, Destination};
use crate::error::{PlannerError, Result};
use crate::search::aspect::{Aspect, AspectScores, AspectWeights};
use crate::search::embedding::{cosine_similarity, EmbeddingModel, EMBEDDING_DIM, MODEL_ID};
use crate::search::store::IndexStore;

/// Post-scoring set-membership filters. Applied after the exhaustive
/// scan; they drop destinations without touching anyone's score.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub country: Option<String>,
    pub budget: Option<BudgetTier>,
    pub season: Option<String>,
}

impl SearchFilters {
    pub fn none() -> Self {
        Self::default()
    }

    fn matches(&self, destination: &Destination) -> bool {
        if let Some(ref country) = self.country {
            if !destination.country.eq_ignore_ascii_case(country) {
                return false;
            }
        }
        if let Some(budget) = self.budget {
            if infer_budget(destination) != budget {
                return false;
            }
        }
        if let Some(ref season) = self.season {
            if !destination.in_season(season) {
                return false;
            }
        }
        true
    }
}

/// One ranked match, with enough detail to explain itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub rank: usize,
    pub name: String,
    pub location: String,
    pub country: String,
    pub budget: BudgetTier,
    pub combined_score: f32,
    pub aspect_scores: AspectScores,
    pub explanation: String,
    pub matched_phrases: Vec<String>,
}

#[derive(Debug)]
pub struct TripPlanner {
    model: EmbeddingModel,
    destinations: Vec<Destination>,
    aspect_vectors: Vec<(Aspect, Vec<Vec<f32>>)>,
}

impl TripPlanner {
    /// Load a published index. Fails with `IndexUnavailable` when no
    /// build has published yet, and refuses an index built by a
    /// different embedding model outright.
    pub fn open(index_path: &Path) -> Result<Self> {
        let store = IndexStore::open(index_path)?;
        let meta = store.meta()?;

        if meta.model_id != MODEL_ID {
            return Err(PlannerError::ModelMismatch {
                built_with: meta.model_id,
                loaded: MODEL_ID.to_string(),
            });
        }
        if meta.embedding_dim != EMBEDDING_DIM {
            return Err(PlannerError::ModelMismatch {
                built_with: format!("{} (dim {})", meta.model_id, meta.embedding_dim),
                loaded: format!("{} (dim {})", MODEL_ID, EMBEDDING_DIM),
            });
        }

        let destinations = store.destinations()?;
        let mut aspect_vectors = Vec::with_capacity(Aspect::ALL.len());
        for aspect in Aspect::ALL {
            let vectors = store.aspect_vectors(aspect)?;
            if vectors.len() != destinations.len() {
                return Err(PlannerError::CorruptIndex {
                    path: index_path.to_path_buf(),
                    key: format!("embeddings/{aspect}"),
                });
            }
            aspect_vectors.push((aspect, vectors));
        }

        Ok(Self {
            model: EmbeddingModel::new(),
            destinations,
            aspect_vectors,
        })
    }

    pub fn destination_count(&self) -> usize {
        self.destinations.len()
    }

    /// Rank the catalog against a free-text query.
    ///
    /// Weights are normalized internally (all-zero stays all-zero and
    /// every combined score is 0; ordering then falls back to name).
    /// Filters run after scoring. Ties always break by name ascending,
    /// so identical inputs produce identical output.
    pub fn search(
        &self,
        query: &str,
        weights: &AspectWeights,
        top_k: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<ScoredResult>> {
        // Validate before any embedding work.
        if query.trim().is_empty() {
            return Err(PlannerError::EmptyQuery);
        }
        if top_k == 0 {
            return Err(PlannerError::InvalidTopK);
        }

        let query_embedding = self
            .model
            .embed(query)
            .map_err(|source| PlannerError::Embedding {
                context: "query".to_string(),
                source,
            })?;

        let weights = weights.normalized();

        // Exhaustive scan: cosine of the query against every
        // destination in every aspect index.
        let mut candidates: Vec<(usize, f32, AspectScores)> = self
            .destinations
            .iter()
            .enumerate()
            .map(|(position, _)| {
                let mut scores = AspectScores::default();
                for (aspect, vectors) in &self.aspect_vectors {
                    scores.set(*aspect, cosine_similarity(&query_embedding, &vectors[position]));
                }
                let combined = Aspect::ALL
                    .iter()
                    .map(|&aspect| weights.get(aspect) * scores.get(aspect))
                    .sum();
                (position, combined, scores)
            })
            .filter(|(position, _, _)| filters.matches(&self.destinations[*position]))
            .collect();

        candidates.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| self.destinations[a.0].name.cmp(&self.destinations[b.0].name))
        });
        candidates.truncate(top_k);

        let results = candidates
            .into_iter()
            .enumerate()
            .map(|(rank, (position, combined, scores))| {
                let destination = &self.destinations[position];
                ScoredResult {
                    rank: rank + 1,
                    name: destination.name.clone(),
                    location: destination.location.clone(),
                    country: destination.country.clone(),
                    budget: infer_budget(destination),
                    combined_score: combined,
                    aspect_scores: scores,
                    explanation: explanation(&weights, &scores),
                    matched_phrases: matched_phrases(query, destination),
                }
            })
            .collect();

        Ok(results)
    }
}

/// Name the aspect(s) that carried the combined score. Aspects within
/// 90% of the top contribution count as co-dominant.
fn explanation(weights: &AspectWeights, scores: &AspectScores) -> String {
    let contributions: Vec<(Aspect, f32)> = Aspect::ALL
        .iter()
        .map(|&aspect| (aspect, weights.get(aspect) * scores.get(aspect)))
        .collect();

    let total: f32 = contributions.iter().map(|(_, c)| c).sum();
    if total <= 0.0 {
        return "No aspect contributed to this match.".to_string();
    }

    let top = contributions
        .iter()
        .map(|&(_, c)| c)
        .fold(f32::MIN, f32::max);
    let dominant: Vec<&str> = contributions
        .iter()
        .filter(|&&(_, c)| c > 0.0 && c >= 0.9 * top)
        .map(|&(aspect, _)| aspect.as_str())
        .collect();

    match dominant.as_slice() {
        [single] => {
            let share = (top / total * 100.0).min(100.0);
            format!("Strongest on {single}, carrying {share:.0}% of the match.")
        }
        [first, second] => format!("Driven about evenly by {first} and {second}."),
        many => format!("A balanced match across {}.", many.join(", ")),
    }
}

/// Destination phrases that textually contain a query term, labelled by
/// the aspect they came from. Terms under 3 characters match too much
/// noise and are skipped.
fn matched_phrases(query: &str, destination: &Destination) -> Vec<String> {
    let mut matched = Vec::new();

    let terms: Vec<regex::Regex> = query
        .split_whitespace()
        .filter(|term| term.chars().count() >= 3)
        .filter_map(|term| {
            RegexBuilder::new(&regex::escape(term))
                .case_insensitive(true)
                .build()
                .ok()
        })
        .collect();

    if terms.is_empty() {
        return matched;
    }

    let sections: [(&str, &[String]); 3] = [
        ("Activity", &destination.activities),
        ("Scenery", &destination.scenery),
        ("Amenity", &destination.amenities),
    ];

    for (label, phrases) in sections {
        for phrase in phrases {
            if terms.iter().any(|re| re.is_match(phrase)) {
                matched.push(format!("{label}: {phrase}"));
            }
        }
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::index::{aspect_text, build_index};
    use std::fs;
    use std::path::PathBuf;

    fn write_record(dir: &Path, file: &str, record: serde_json::Value) {
        fs::write(dir.join(file), record.to_string()).unwrap();
    }

    /// Two destinations with disjoint vocabularies: one is all about
    /// scenery, the other all about activities. Descriptions are empty
    /// so each aspect's text is exactly its phrase list.
    fn contrasting_catalog(dir: &Path) {
        write_record(
            dir,
            "meadows.json",
            serde_json::json!({
                "name": "Alpine Meadows",
                "location": "High Sierra",
                "country": "USA",
                "description": "",
                "activities": ["quiet reading"],
                "scenery": ["granite peaks", "wildflower meadows"],
                "amenities": ["visitor centers"],
                "best_season": ["Summer"],
            }),
        );
        write_record(
            dir,
            "gorge.json",
            serde_json::json!({
                "name": "River Gorge",
                "location": "Columbia Basin",
                "country": "USA",
                "description": "",
                "activities": ["trail running", "river rafting"],
                "scenery": ["concrete overpass"],
                "amenities": ["parking garages"],
                "best_season": ["Spring"],
            }),
        );
    }

    fn build_and_open(catalog_dir: &Path) -> (TripPlanner, PathBuf, tempfile::TempDir) {
        let out = tempfile::tempdir().unwrap();
        let index_path = out.path().join("index.db");
        build_index(catalog_dir, &index_path, &EmbeddingModel::new()).unwrap();
        let planner = TripPlanner::open(&index_path).unwrap();
        (planner, index_path, out)
    }

    #[test]
    fn own_aspect_text_ranks_first() {
        let catalog_dir = tempfile::tempdir().unwrap();
        contrasting_catalog(catalog_dir.path());
        let (planner, _, _guard) = build_and_open(catalog_dir.path());

        let catalog = crate::catalog::load_catalog(catalog_dir.path()).unwrap();
        let meadows = catalog.iter().find(|d| d.name == "Alpine Meadows").unwrap();
        let query = aspect_text(meadows, Aspect::Scenery);

        let results = planner
            .search(
                &query,
                &AspectWeights::only(Aspect::Scenery),
                5,
                &SearchFilters::none(),
            )
            .unwrap();

        assert_eq!(results[0].name, "Alpine Meadows");
        assert!((results[0].aspect_scores.scenery - 1.0).abs() < 1e-4);
    }

    #[test]
    fn weight_shift_flips_the_ranking() {
        let catalog_dir = tempfile::tempdir().unwrap();
        contrasting_catalog(catalog_dir.path());
        let (planner, _, _guard) = build_and_open(catalog_dir.path());

        let query = "granite peaks wildflower meadows trail running river rafting";

        let scenery_heavy = AspectWeights::parse_args(&[
            "scenery=0.9".to_string(),
            "activities=0.1".to_string(),
        ])
        .unwrap();
        let results = planner
            .search(query, &scenery_heavy, 2, &SearchFilters::none())
            .unwrap();
        assert_eq!(results[0].name, "Alpine Meadows");
        assert_eq!(results[1].name, "River Gorge");

        let activity_heavy = AspectWeights::parse_args(&[
            "scenery=0.1".to_string(),
            "activities=0.9".to_string(),
        ])
        .unwrap();
        let results = planner
            .search(query, &activity_heavy, 2, &SearchFilters::none())
            .unwrap();
        assert_eq!(results[0].name, "River Gorge");
        assert_eq!(results[1].name, "Alpine Meadows");
    }

    #[test]
    fn all_zero_weights_score_zero_and_order_by_name() {
        let catalog_dir = tempfile::tempdir().unwrap();
        contrasting_catalog(catalog_dir.path());
        let (planner, _, _guard) = build_and_open(catalog_dir.path());

        let results = planner
            .search("anything at all", &AspectWeights::zero(), 5, &SearchFilters::none())
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "Alpine Meadows");
        assert_eq!(results[1].name, "River Gorge");
        for result in &results {
            assert_eq!(result.combined_score, 0.0);
            assert_eq!(result.explanation, "No aspect contributed to this match.");
        }
    }

    #[test]
    fn identical_inputs_produce_identical_output() {
        let catalog_dir = tempfile::tempdir().unwrap();
        contrasting_catalog(catalog_dir.path());
        let (planner, _, _guard) = build_and_open(catalog_dir.path());

        let weights = AspectWeights::default();
        let first = planner
            .search("river rafting near peaks", &weights, 5, &SearchFilters::none())
            .unwrap();
        let second = planner
            .search("river rafting near peaks", &weights, 5, &SearchFilters::none())
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn country_filter_keeps_exactly_the_matching_destination() {
        let catalog_dir = tempfile::tempdir().unwrap();
        contrasting_catalog(catalog_dir.path());
        write_record(
            catalog_dir.path(),
            "dolomites.json",
            serde_json::json!({
                "name": "Dolomite Passes",
                "location": "South Tyrol",
                "country": "Italy",
                "description": "",
                "activities": ["via ferrata"],
                "scenery": ["limestone towers"],
                "amenities": ["mountain huts"],
                "best_season": ["Summer"],
            }),
        );
        let (planner, _, _guard) = build_and_open(catalog_dir.path());

        let filters = SearchFilters {
            country: Some("italy".to_string()),
            ..SearchFilters::none()
        };
        let results = planner
            .search("limestone towers", &AspectWeights::default(), 50, &filters)
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Dolomite Passes");
    }

    #[test]
    fn budget_and_season_filters_compose() {
        let catalog_dir = tempfile::tempdir().unwrap();
        write_record(
            catalog_dir.path(),
            "lagoon.json",
            serde_json::json!({
                "name": "Lagoon Resort",
                "location": "Atoll",
                "country": "Maldives",
                "description": "",
                "activities": ["snorkeling"],
                "scenery": ["turquoise water"],
                "amenities": ["overwater villa", "spa"],
                "best_season": ["Winter"],
            }),
        );
        write_record(
            catalog_dir.path(),
            "hostel.json",
            serde_json::json!({
                "name": "Canyon Hostel",
                "location": "Desert Rim",
                "country": "USA",
                "description": "",
                "activities": ["canyoneering"],
                "scenery": ["red rock"],
                "amenities": ["hostel bunks"],
                "best_season": ["Winter", "Spring"],
            }),
        );
        let (planner, _, _guard) = build_and_open(catalog_dir.path());

        let filters = SearchFilters {
            budget: Some(BudgetTier::Luxury),
            season: Some("winter".to_string()),
            ..SearchFilters::none()
        };
        let results = planner
            .search("warm water escape", &AspectWeights::default(), 10, &filters)
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Lagoon Resort");
        assert_eq!(results[0].budget, BudgetTier::Luxury);
    }

    #[test]
    fn filters_matching_nothing_return_empty_not_error() {
        let catalog_dir = tempfile::tempdir().unwrap();
        contrasting_catalog(catalog_dir.path());
        let (planner, _, _guard) = build_and_open(catalog_dir.path());

        let filters = SearchFilters {
            country: Some("Atlantis".to_string()),
            ..SearchFilters::none()
        };
        let results = planner
            .search("anything", &AspectWeights::default(), 5, &filters)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn invalid_queries_fail_fast() {
        let catalog_dir = tempfile::tempdir().unwrap();
        contrasting_catalog(catalog_dir.path());
        let (planner, _, _guard) = build_and_open(catalog_dir.path());

        let err = planner
            .search("   ", &AspectWeights::default(), 5, &SearchFilters::none())
            .unwrap_err();
        assert!(matches!(err, PlannerError::EmptyQuery));

        let err = planner
            .search("beaches", &AspectWeights::default(), 0, &SearchFilters::none())
            .unwrap_err();
        assert!(matches!(err, PlannerError::InvalidTopK));
    }

    #[test]
    fn missing_index_is_signalled_distinctly() {
        let dir = tempfile::tempdir().unwrap();
        let err = TripPlanner::open(&dir.path().join("absent.db")).unwrap_err();
        assert!(matches!(err, PlannerError::IndexUnavailable(_)));
    }

    #[test]
    fn foreign_model_index_is_refused() {
        use crate::search::store::{IndexEntry, IndexMeta, IndexStore};

        let dir = tempfile::tempdir().unwrap();
        let index_path = dir.path().join("foreign.db");
        let mut store = IndexStore::create(&index_path).unwrap();
        let entry = IndexEntry {
            destination: crate::catalog::Destination {
                name: "Anywhere".into(),
                location: "Anywhere".into(),
                state: None,
                country: "USA".into(),
                description: String::new(),
                activities: vec![],
                scenery: vec![],
                amenities: vec![],
                best_season: vec![],
                travel_time: None,
                nearby_attractions: vec![],
                keywords: vec![],
            },
            embeddings: Aspect::ALL
                .iter()
                .map(|&aspect| (aspect, vec![0.0; 8]))
                .collect(),
        };
        store
            .write_all(
                &[entry],
                &IndexMeta {
                    model_id: "bert-base".into(),
                    embedding_dim: 8,
                    destination_count: 1,
                    built_at: 0,
                },
            )
            .unwrap();
        drop(store);

        let err = TripPlanner::open(&index_path).unwrap_err();
        assert!(matches!(err, PlannerError::ModelMismatch { .. }));
    }

    #[test]
    fn explanation_names_the_dominant_aspect() {
        let weights = AspectWeights::only(Aspect::Scenery);
        let scores = AspectScores {
            activities: 0.9,
            scenery: 0.8,
            amenities: 0.9,
            location: 0.9,
        };
        let text = explanation(&weights.normalized(), &scores);
        assert!(text.contains("scenery"), "got: {text}");
        assert!(text.contains("100%"), "got: {text}");
    }

    #[test]
    fn matched_phrases_label_their_aspect() {
        let destination = crate::catalog::Destination {
            name: "Big Sur".into(),
            location: "Highway 1".into(),
            state: None,
            country: "USA".into(),
            description: String::new(),
            activities: vec!["whale watching".into(), "surfing".into()],
            scenery: vec!["sea cliffs".into()],
            amenities: vec!["campgrounds".into()],
            best_season: vec![],
            travel_time: None,
            nearby_attractions: vec![],
            keywords: vec![],
        };

        let matched = matched_phrases("Watching whales from CLIFFS", &destination);
        assert!(matched.contains(&"Activity: whale watching".to_string()));
        assert!(matched.contains(&"Scenery: sea cliffs".to_string()));
        assert!(!matched.iter().any(|m| m.starts_with("Amenity")));
    }
}
