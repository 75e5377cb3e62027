//! In-memory catalog session for tests.

use super::traits::CatalogSession;
use crate::models::{PlatformKey, Quality, RawTrack};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Started(String),
    Finished(String),
}

#[derive(Default)]
pub struct MockSession {
    id: String,
    tracks: Vec<RawTrack>,
    fail_search: bool,
    fail_stream: bool,
    fail_signals: bool,
    signal_delay: Option<Duration>,
    pub searches: Mutex<Vec<String>>,
    pub signals: Mutex<Vec<Signal>>,
}

impl MockSession {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_tracks(mut self, tracks: Vec<RawTrack>) -> Self {
        self.tracks = tracks;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn failing_stream(mut self) -> Self {
        self.fail_stream = true;
        self
    }

    pub fn failing_signals(mut self) -> Self {
        self.fail_signals = true;
        self
    }

    /// Every scrobble call takes `delay` before it is recorded.
    pub fn with_signal_delay(mut self, delay: Duration) -> Self {
        self.signal_delay = Some(delay);
        self
    }

    async fn delay(&self) {
        if let Some(delay) = self.signal_delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.signals.lock().clone()
    }

    pub fn finished(&self) -> Vec<String> {
        self.signals
            .lock()
            .iter()
            .filter_map(|s| match s {
                Signal::Finished(id) => Some(id.clone()),
                Signal::Started(_) => None,
            })
            .collect()
    }
}

pub fn track(id: &str, title: &str, artist: &str, duration: u64) -> RawTrack {
    RawTrack {
        key: PlatformKey::Subsonic {
            music_id: id.to_string(),
            song_type: Some("mp3".to_string()),
        },
        title: title.to_string(),
        artist: artist.to_string(),
        album: String::new(),
        duration,
        bit_rate: 320,
        size: 0,
        year: None,
    }
}

#[async_trait]
impl CatalogSession for MockSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn source(&self) -> &str {
        "Mock"
    }

    async fn search(&self, keyword: &str) -> Result<Vec<RawTrack>> {
        self.searches.lock().push(keyword.to_string());
        if self.fail_search {
            return Err(anyhow!("search unavailable"));
        }
        Ok(self.tracks.clone())
    }

    async fn resolve_stream_url(&self, track_id: &str, quality: Quality) -> Result<String> {
        if self.fail_stream {
            return Err(anyhow!("stream unavailable"));
        }
        Ok(format!("mock://{}/{}?q={}", self.id, track_id, quality.as_str()))
    }

    async fn signal_play_started(&self, track_id: &str, _timestamp_ms: i64) -> Result<()> {
        self.delay().await;
        self.signals.lock().push(Signal::Started(track_id.to_string()));
        if self.fail_signals {
            return Err(anyhow!("scrobble rejected"));
        }
        Ok(())
    }

    async fn signal_play_finished(&self, track_id: &str, _timestamp_ms: i64) -> Result<()> {
        self.delay().await;
        self.signals.lock().push(Signal::Finished(track_id.to_string()));
        if self.fail_signals {
            return Err(anyhow!("scrobble rejected"));
        }
        Ok(())
    }
}
