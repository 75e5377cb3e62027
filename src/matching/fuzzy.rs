//! Text similarity used by the candidate scorer.

use strsim::normalized_levenshtein;

/// Which field is being compared; singer names are multi-valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    SongName,
    SingerName,
}

pub trait FuzzyMatcher: Send + Sync {
    /// Similarity in `[0, 1]` between the query-side `reference` and a candidate value.
    fn similarity(&self, reference: &str, candidate: &str, kind: FieldKind) -> f32;
}

/// Separators seen between multiple artist names.
const ARTIST_SEPARATORS: &[char] = &['、', ',', '，', '/', ';'];

/// Default matcher on top of normalized Levenshtein distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityMatcher;

impl FuzzyMatcher for SimilarityMatcher {
    fn similarity(&self, reference: &str, candidate: &str, kind: FieldKind) -> f32 {
        let reference = reference.trim().to_uppercase();
        let candidate = candidate.trim().to_uppercase();
        if reference.is_empty() || candidate.is_empty() {
            return 0.0;
        }

        let score = match kind {
            FieldKind::SongName => song_name_similarity(&reference, &candidate),
            FieldKind::SingerName => singer_name_similarity(&reference, &candidate),
        };
        score.clamp(0.0, 1.0) as f32
    }
}

fn song_name_similarity(reference: &str, candidate: &str) -> f64 {
    let full = normalized_levenshtein(reference, candidate);
    let stripped = strip_bracketed(candidate);
    if stripped.is_empty() || stripped == candidate {
        return full;
    }
    full.max(normalized_levenshtein(reference, &stripped))
}

/// Each query artist takes its best match among the candidate's artists; the result is the mean.
fn singer_name_similarity(reference: &str, candidate: &str) -> f64 {
    let wanted = split_artists(reference);
    let offered = split_artists(candidate);
    if wanted.is_empty() || offered.is_empty() {
        return 0.0;
    }

    let total: f64 = wanted
        .iter()
        .map(|w| {
            offered
                .iter()
                .map(|o| normalized_levenshtein(w, o))
                .fold(0.0, f64::max)
        })
        .sum();
    total / wanted.len() as f64
}

fn split_artists(names: &str) -> Vec<&str> {
    names
        .split(ARTIST_SEPARATORS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Drop "(Live)", "[Remastered]", "（伴奏）" and similar bracketed suffixes.
fn strip_bracketed(title: &str) -> String {
    let mut result = String::with_capacity(title.len());
    let mut depth = 0i32;
    for c in title.chars() {
        match c {
            '(' | '[' | '（' | '【' => depth += 1,
            ')' | ']' | '）' | '】' => depth = (depth - 1).max(0),
            _ if depth == 0 => result.push(c),
            _ => {}
        }
    }
    result.trim().to_string()
}
