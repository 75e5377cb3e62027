//! Candidate matching: similarity, scoring and selection.
//!
//! All of this is pure and cannot fail; it runs after the catalog search and
//! before any stream URL is resolved.

pub mod fuzzy;
pub mod scorer;
pub mod selector;

pub use fuzzy::{FieldKind, FuzzyMatcher, SimilarityMatcher};
pub use scorer::score_candidate;
pub use selector::select;
