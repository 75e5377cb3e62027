use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Quality {
    LOW,
    HIGH,
    #[default]
    LOSSLESS,
}

impl Quality {
    pub fn as_str(&self) -> &str {
        match self {
            Quality::LOSSLESS => "LOSSLESS",
            Quality::HIGH => "HIGH",
            Quality::LOW => "LOW",
        }
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOSSLESS" => Ok(Quality::LOSSLESS),
            "HIGH" => Ok(Quality::HIGH),
            "LOW" => Ok(Quality::LOW),
            _ => Err(format!("Invalid quality: {}", s)),
        }
    }
}

/// How the returned candidates are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OrderBy {
    /// Rank by computed match score, best first.
    #[default]
    MatchedScoreDesc,
    /// Keep the backend's native ordering.
    PlatformDefault,
}

/// A user's search intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SearchQuery {
    pub keyword: String,
    pub name: String,
    pub artists_name: String,
    #[serde(default)]
    pub order_by: OrderBy,
    /// Maximum number of candidates to return, 0 means unlimited.
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub quality: Quality,
}

impl SearchQuery {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Default::default()
        }
    }

    pub fn with_song(mut self, name: impl Into<String>, artists_name: impl Into<String>) -> Self {
        self.name = name.into();
        self.artists_name = artists_name.into();
        self
    }

    pub fn with_order(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Upper-cased copy of the free-text fields, used for case-insensitive matching.
    pub fn normalized(&self) -> Self {
        Self {
            keyword: self.keyword.to_uppercase(),
            name: self.name.to_uppercase(),
            artists_name: self.artists_name.to_uppercase(),
            ..self.clone()
        }
    }
}

/// Backend-specific identity of a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum PlatformKey {
    Subsonic {
        music_id: String,
        /// File suffix as reported by the server (e.g. "flac", "mp3")
        song_type: Option<String>,
    },
}

impl PlatformKey {
    /// Native id used for stream and scrobble calls.
    pub fn track_id(&self) -> &str {
        match self {
            PlatformKey::Subsonic { music_id, .. } => music_id,
        }
    }

    pub fn id_prefix(&self) -> &'static str {
        match self {
            PlatformKey::Subsonic { .. } => "subsonic",
        }
    }
}

/// One record as returned by a catalog search, before scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTrack {
    pub key: PlatformKey,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Seconds
    pub duration: u64,
    /// Kilobits per second, as reported by the backend
    pub bit_rate: u64,
    pub size: u64,
    pub year: Option<u32>,
}

/// A scored track, ready to be returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub key: PlatformKey,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: u64,
    /// Bits per second
    pub bit_rate: u64,
    pub size: u64,
    pub stream_url: Option<String>,
    pub match_score: f32,
    pub source: String,
}

impl Candidate {
    pub fn from_raw(raw: RawTrack, source: impl Into<String>) -> Self {
        Self {
            id: format!("{}:{}", raw.key.id_prefix(), raw.key.track_id()),
            key: raw.key,
            title: raw.title,
            artist: raw.artist,
            album: raw.album,
            duration: raw.duration,
            bit_rate: raw.bit_rate * 1000,
            size: raw.size,
            stream_url: None,
            match_score: 0.0,
            source: source.into(),
        }
    }

    pub fn track_id(&self) -> &str {
        self.key.track_id()
    }
}

/// Anything the selector can order by match score.
pub trait Ranked {
    fn match_score(&self) -> f32;
}

impl Ranked for Candidate {
    fn match_score(&self) -> f32 {
        self.match_score
    }
}
