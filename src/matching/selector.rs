use crate::models::{OrderBy, Ranked, SearchQuery};

/// Order and cap scored candidates according to the query.
///
/// Sorting is stable, so equal scores keep the backend's relative order.
pub fn select<T: Ranked>(query: &SearchQuery, mut candidates: Vec<T>) -> Vec<T> {
    if query.order_by == OrderBy::MatchedScoreDesc && candidates.len() > 1 {
        candidates.sort_by(|a, b| b.match_score().total_cmp(&a.match_score()));
    }
    if query.limit > 0 && candidates.len() > query.limit {
        candidates.truncate(query.limit);
    }
    candidates
}
