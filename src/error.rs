//! Error taxonomy for the catalog, index builder, and query engine.
//!
//! Callers need to tell apart "you have to build an index first" from
//! "nothing matched your filters" from "the build input is broken", so
//! every failure surfaces as a distinct variant instead of a stringly
//! anyhow chain. The command layer wraps these with context.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// No destination files found in the catalog directory.
    #[error("no destination files found in {0}")]
    EmptyCatalog(PathBuf),

    /// Two catalog entries share the same name. Results are keyed by
    /// name, so the build refuses to continue.
    #[error("duplicate destination name '{name}' in {path}")]
    DuplicateName { name: String, path: PathBuf },

    /// A destination file exists but does not parse as a record.
    #[error("malformed destination record {path}: {source}")]
    MalformedRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The embedding model failed while processing the given text.
    #[error("embedding failed for {context}: {source}")]
    Embedding {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    /// No published index at the given path. Distinct from an empty
    /// result set: the fix is to run a build, not to loosen filters.
    #[error("no search index at {0}; run `wayfinder build` first")]
    IndexUnavailable(PathBuf),

    /// The index was built with a different embedding model than the
    /// one loaded now. Mixing them would silently corrupt similarity.
    #[error("index built with model '{built_with}' but loaded model is '{loaded}'")]
    ModelMismatch { built_with: String, loaded: String },

    /// The index metadata is missing or unreadable.
    #[error("index at {path} is missing metadata key '{key}'")]
    CorruptIndex { path: PathBuf, key: String },

    #[error("query text is empty")]
    EmptyQuery,

    #[error("top_k must be at least 1")]
    InvalidTopK,

    /// Aspect name outside the four recognized ones. Rejected rather
    /// than ignored so a typo cannot silently drop a weight.
    #[error("unknown aspect '{0}' (expected activities, scenery, amenities, or location)")]
    UnknownAspect(String),

    #[error("weight for {aspect} must be non-negative, got {value}")]
    NegativeWeight { aspect: &'static str, value: f32 },

    #[error("malformed weight '{0}' (expected aspect=value, e.g. scenery=0.4)")]
    MalformedWeight(String),

    #[error("unknown budget tier '{0}' (expected luxury, mid-range, or budget-friendly)")]
    UnknownBudgetTier(String),

    #[error("index storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
