//! Match scoring of one catalog result against a normalized query.

use super::fuzzy::{FieldKind, FuzzyMatcher};
use crate::models::{OrderBy, SearchQuery};

const TITLE_WEIGHT: f32 = 0.55;
const ARTIST_WEIGHT: f32 = 0.35;
const POSITION_WEIGHT: f32 = 0.1;

/// Multiplier for live/concert recordings the user did not ask for.
const LIVE_PENALTY: f32 = 0.6;

/// Title markers that reject a result outright unless the keyword mentions them.
/// Checked in this order.
const EXCLUDED_MARKERS: &[&str] = &["伴奏", "DJ", "COVER", "MIX"];

const LIVE_MARKERS: &[&str] = &["LIVE", "演唱会"];

/// Score one candidate.
///
/// Returns `None` when the candidate is rejected by an exclusion rule. Under
/// [`OrderBy::PlatformDefault`] every candidate is accepted with a score of 0.
///
/// `index` is the candidate's position in the backend's result list and
/// `max_index` the size of the window the caller considers; it must be at least 1.
pub fn score_candidate(
    query: &SearchQuery,
    title: &str,
    artist: &str,
    index: usize,
    max_index: usize,
    matcher: &dyn FuzzyMatcher,
) -> Option<f32> {
    if query.order_by == OrderBy::PlatformDefault {
        return Some(0.0);
    }
    debug_assert!(max_index >= 1, "max_index must be at least 1");

    let upper_title = title.to_uppercase();
    let upper_keyword = query.keyword.to_uppercase();

    if let Some(marker) = EXCLUDED_MARKERS
        .iter()
        .find(|m| upper_title.contains(*m) && !upper_keyword.contains(*m))
    {
        log::debug!("Rejected '{}': contains '{}'", title, marker);
        return None;
    }

    let title_score = title_similarity(query, title, matcher);
    let artist_score = artist_similarity(query, artist, matcher);
    let bonus = position_bonus(index, max_index);

    Some(title_score * TITLE_WEIGHT + artist_score * ARTIST_WEIGHT + bonus)
}

pub(crate) fn title_similarity(query: &SearchQuery, title: &str, matcher: &dyn FuzzyMatcher) -> f32 {
    if title.is_empty() {
        return 0.0;
    }

    let score = matcher.similarity(&query.name, title, FieldKind::SongName);
    let upper_title = title.to_uppercase();
    let upper_keyword = query.keyword.to_uppercase();
    let unrequested_live = LIVE_MARKERS
        .iter()
        .any(|m| upper_title.contains(m) && !upper_keyword.contains(m));

    if unrequested_live {
        score * LIVE_PENALTY
    } else {
        score
    }
}

pub(crate) fn artist_similarity(query: &SearchQuery, artist: &str, matcher: &dyn FuzzyMatcher) -> f32 {
    if artist.is_empty() {
        return 0.0;
    }
    let artist = artist.replace(['&', '·'], "、");
    matcher.similarity(&query.artists_name, &artist, FieldKind::SingerName)
}

pub(crate) fn position_bonus(index: usize, max_index: usize) -> f32 {
    POSITION_WEIGHT * (max_index as f32 - index as f32) / max_index as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::fuzzy::SimilarityMatcher;
    use parking_lot::Mutex;

    /// Returns fixed scores and records what it was asked.
    struct FixedMatcher {
        song: f32,
        singer: f32,
        seen_singers: Mutex<Vec<String>>,
    }

    impl FixedMatcher {
        fn new(song: f32, singer: f32) -> Self {
            Self {
                song,
                singer,
                seen_singers: Mutex::new(Vec::new()),
            }
        }
    }

    impl FuzzyMatcher for FixedMatcher {
        fn similarity(&self, _reference: &str, candidate: &str, kind: FieldKind) -> f32 {
            match kind {
                FieldKind::SongName => self.song,
                FieldKind::SingerName => {
                    self.seen_singers.lock().push(candidate.to_string());
                    self.singer
                }
            }
        }
    }

    fn query(keyword: &str) -> SearchQuery {
        SearchQuery::new(keyword).with_song(keyword, "QUEEN").normalized()
    }

    #[test]
    fn test_platform_default_accepts_everything() {
        let q = query("song").with_order(OrderBy::PlatformDefault);
        let m = FixedMatcher::new(1.0, 1.0);
        assert_eq!(score_candidate(&q, "SONG (伴奏)", "x", 0, 1, &m), Some(0.0));
    }

    #[test]
    fn test_instrumental_is_rejected() {
        let q = query("SONG");
        let m = FixedMatcher::new(1.0, 1.0);
        assert_eq!(score_candidate(&q, "SONG (伴奏)", "Queen", 0, 10, &m), None);
        assert_eq!(score_candidate(&q, "SONG (伴奏)", "", 9, 10, &m), None);
    }

    #[test]
    fn test_exclusions_are_case_insensitive() {
        let q = query("song");
        let m = FixedMatcher::new(1.0, 1.0);
        assert_eq!(score_candidate(&q, "Song (dj edit)", "", 0, 1, &m), None);
        assert_eq!(score_candidate(&q, "Song (Cover)", "", 0, 1, &m), None);
        assert_eq!(score_candidate(&q, "Song (Remix)", "", 0, 1, &m), None);
    }

    #[test]
    fn test_requested_marker_is_allowed() {
        let q = query("song remix");
        let m = FixedMatcher::new(1.0, 1.0);
        assert!(score_candidate(&q, "Song (Remix)", "", 0, 1, &m).is_some());
    }

    #[test]
    fn test_live_penalty_scales_title_component() {
        let q = query("X");
        let m = FixedMatcher::new(0.8, 0.5);

        let studio = title_similarity(&q, "X", &m);
        let live = title_similarity(&q, "X (Live)", &m);
        assert!((live - studio * 0.6).abs() < 1e-6);

        let concert = title_similarity(&q, "X 演唱会", &m);
        assert!((concert - studio * 0.6).abs() < 1e-6);

        let full_studio = score_candidate(&q, "X", "Queen", 0, 1, &m).unwrap();
        let full_live = score_candidate(&q, "X (Live)", "Queen", 0, 1, &m).unwrap();
        assert!((full_studio - full_live - 0.8 * 0.55 * 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_live_not_penalized_when_requested() {
        let q = query("X live");
        let m = FixedMatcher::new(0.8, 0.0);
        assert_eq!(title_similarity(&q, "X (Live)", &m), 0.8);
    }

    #[test]
    fn test_position_bonus_monotonic() {
        let q = query("X");
        let m = FixedMatcher::new(0.5, 0.5);
        let first = score_candidate(&q, "X", "Queen", 0, 10, &m).unwrap();
        let sixth = score_candidate(&q, "X", "Queen", 5, 10, &m).unwrap();
        assert!(first > sixth);
        assert!((position_bonus(0, 10) - 0.1).abs() < 1e-6);
        assert!((position_bonus(5, 10) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_artist_separators_are_normalized() {
        let q = query("X");
        let m = FixedMatcher::new(0.0, 1.0);
        score_candidate(&q, "X", "Freddie & Brian·Roger", 0, 1, &m);
        assert_eq!(m.seen_singers.lock().as_slice(), ["Freddie 、 Brian、Roger"]);
    }

    #[test]
    fn test_empty_fields_contribute_nothing() {
        let q = query("X");
        let m = FixedMatcher::new(1.0, 1.0);
        let score = score_candidate(&q, "", "", 2, 4, &m).unwrap();
        assert!((score - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_weights_with_real_matcher() {
        let q = SearchQuery::new("respect")
            .with_song("Respect", "Queen")
            .normalized();
        let score = score_candidate(&q, "Respect", "Queen", 0, 5, &SimilarityMatcher).unwrap();
        assert!((score - 1.0).abs() < 1e-6);
    }
}
