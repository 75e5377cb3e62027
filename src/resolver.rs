//! Search, score and hand out the best-matching track.
//!
//! ```text
//! [SearchQuery] → normalize → [SessionPool] → search2 → score → select → stream URL → scrobble
//! ```
//!
//! Every backend failure degrades to fewer or no candidates; nothing here
//! returns an error to the caller.

use std::sync::Arc;

use crate::config::{ResolverConfig, MAX_CONSIDERED_RESULTS};
use crate::errors::ResolveError;
use crate::matching::{score_candidate, select, FuzzyMatcher, SimilarityMatcher};
use crate::models::{Candidate, SearchQuery};
use crate::playback_notifier::PlaybackNotifier;
use crate::providers::CatalogSession;
use crate::session_pool::SessionPool;

/// How many of the backend's results are scored for a list of `len` results.
pub fn considered_window(len: usize) -> usize {
    (len / 2 + 1).min(MAX_CONSIDERED_RESULTS)
}

pub struct TrackResolver {
    pool: SessionPool,
    notifier: PlaybackNotifier,
    matcher: Box<dyn FuzzyMatcher>,
    prefer_earliest_release: bool,
}

impl TrackResolver {
    pub fn new(pool: SessionPool) -> Self {
        Self {
            pool,
            notifier: PlaybackNotifier::new(),
            matcher: Box::new(SimilarityMatcher),
            prefer_earliest_release: true,
        }
    }

    /// Authenticate every configured account and build a resolver over them.
    pub async fn connect(config: &ResolverConfig) -> Self {
        let pool = SessionPool::connect(config).await;
        Self::new(pool).with_release_ordering(config.prefer_earliest_release)
    }

    pub fn with_matcher(mut self, matcher: impl FuzzyMatcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    pub fn with_release_ordering(mut self, prefer_earliest_release: bool) -> Self {
        self.prefer_earliest_release = prefer_earliest_release;
        self
    }

    pub fn pool(&self) -> &SessionPool {
        &self.pool
    }

    pub fn notifier(&self) -> &PlaybackNotifier {
        &self.notifier
    }

    /// Scored and ordered candidates for `query`; empty on any failure.
    pub async fn search_song(&self, query: &SearchQuery) -> Vec<Candidate> {
        let session = match self.pool.acquire() {
            Ok(session) => session,
            Err(e) => {
                log::warn!("Search for '{}' skipped: {}", query.keyword, e);
                return Vec::new();
            }
        };
        self.search_with(session.as_ref(), query).await
    }

    async fn search_with(&self, session: &dyn CatalogSession, query: &SearchQuery) -> Vec<Candidate> {
        let normalized = query.normalized();

        let mut tracks = match session.search(&query.keyword).await {
            Ok(tracks) => tracks,
            Err(e) => {
                log::warn!("{}", ResolveError::backend("search", e));
                return Vec::new();
            }
        };

        if self.prefer_earliest_release {
            tracks.sort_by_key(|t| t.year.unwrap_or(u32::MAX));
        }

        let max_index = considered_window(tracks.len());
        let candidates: Vec<Candidate> = tracks
            .into_iter()
            .take(max_index)
            .enumerate()
            .filter_map(|(index, raw)| {
                let score = score_candidate(
                    &normalized,
                    &raw.title,
                    &raw.artist,
                    index,
                    max_index,
                    self.matcher.as_ref(),
                )?;
                log::debug!("#{} '{}' by '{}' scored {:.3}", index, raw.title, raw.artist, score);

                let mut candidate = Candidate::from_raw(raw, session.source());
                candidate.match_score = score;
                Some(candidate)
            })
            .collect();

        let selected = select(&normalized, candidates);
        log::info!(
            "Search '{}' on {}: {} candidate(s)",
            query.keyword,
            session.id(),
            selected.len()
        );
        selected
    }

    /// Attach a stream URL to `candidate` and start the playback notification.
    ///
    /// On failure the candidate comes back without a URL and nothing is scrobbled.
    pub async fn get_song_url(&self, query: &SearchQuery, candidate: Candidate) -> Candidate {
        let session = match self.pool.acquire() {
            Ok(session) => session,
            Err(e) => {
                log::warn!("Cannot resolve '{}': {}", candidate.title, e);
                return candidate;
            }
        };
        self.resolve_with(session, query, candidate).await
    }

    async fn resolve_with(
        &self,
        session: Arc<dyn CatalogSession>,
        query: &SearchQuery,
        mut candidate: Candidate,
    ) -> Candidate {
        match session
            .resolve_stream_url(candidate.track_id(), query.quality)
            .await
        {
            Ok(url) => candidate.stream_url = Some(url),
            Err(e) => {
                log::warn!("{}", ResolveError::backend("stream", e));
                return candidate;
            }
        }

        self.notifier.notify_playback(session, candidate).await
    }

    /// Best-matching track for `query`, or `None` when nothing matched.
    ///
    /// The session that ran the search also serves the stream URL and the
    /// scrobbles, since track ids are only meaningful on their own server.
    pub async fn parse_song(&self, query: &SearchQuery) -> Option<Candidate> {
        let session = match self.pool.acquire() {
            Ok(session) => session,
            Err(e) => {
                log::warn!("Search for '{}' skipped: {}", query.keyword, e);
                return None;
            }
        };

        let best = self
            .search_with(session.as_ref(), query)
            .await
            .into_iter()
            .next();
        match best {
            Some(candidate) => Some(self.resolve_with(session, query, candidate).await),
            None => {
                log::info!("No match for '{}'", query.keyword);
                None
            }
        }
    }
}
