use crate::models::{Quality, RawTrack};
use anyhow::Result;
use async_trait::async_trait;

/// An authenticated connection to one catalog backend.
///
/// Sessions are read-only after authentication and may be used from
/// several requests at once.
#[async_trait]
pub trait CatalogSession: Send + Sync {
    /// Stable identifier, e.g. "alice@https://music.example.org"
    fn id(&self) -> &str;

    /// Tag stamped on every candidate this session produces
    fn source(&self) -> &str;

    /// Search songs by free-text keyword.
    async fn search(&self, keyword: &str) -> Result<Vec<RawTrack>>;

    /// Playback URL for a backend-native track id.
    async fn resolve_stream_url(&self, track_id: &str, quality: Quality) -> Result<String>;

    /// "Now playing" signal; `timestamp_ms` is Unix time in milliseconds.
    async fn signal_play_started(&self, track_id: &str, timestamp_ms: i64) -> Result<()>;

    /// "Played" submission sent once a track has been listened to long enough.
    async fn signal_play_finished(&self, track_id: &str, timestamp_ms: i64) -> Result<()>;
}
