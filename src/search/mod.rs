//! Multi-aspect semantic search over the destination catalog.
//!
//! Four indices (activities, scenery, amenities, location), one shared
//! order table, exhaustive weighted scoring at query time.

pub mod aspect;
pub mod embedding;
pub mod engine;
pub mod index;
pub mod store;

pub use aspect::{Aspect, AspectScores, AspectWeights};
pub use embedding::EmbeddingModel;
pub use engine::{ScoredResult, SearchFilters, TripPlanner};
pub use index::{build_index, BuildSummary};
pub use store::IndexStore;
