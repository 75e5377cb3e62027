use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::models::{PlatformKey, RawTrack};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsonicResponse<T> {
    #[serde(rename = "subsonic-response")]
    pub subsonic_response: SubsonicResponseInner<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsonicResponseInner<T> {
    pub status: String,
    pub version: String,
    #[serde(flatten)]
    pub data: Option<T>,
    pub error: Option<SubsonicError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsonicError {
    pub code: i32,
    pub message: String,
}

/// Payload of endpoints that only report status (ping, scrobble).
#[derive(Debug, Deserialize)]
pub struct EmptyData {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult2Data {
    pub search_result2: Option<SearchResult2>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult2 {
    #[serde(default)]
    pub song: Vec<SubsonicSong>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsonicSong {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    pub album: Option<String>,
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub duration: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub year: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub bit_rate: Option<u32>,
    pub suffix: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub size: Option<u64>,
}

impl From<SubsonicSong> for RawTrack {
    fn from(song: SubsonicSong) -> Self {
        RawTrack {
            key: PlatformKey::Subsonic {
                music_id: song.id,
                song_type: song.suffix,
            },
            title: song.title,
            artist: song.artist.unwrap_or_default(),
            album: song.album.unwrap_or_default(),
            duration: song.duration.unwrap_or(0),
            bit_rate: song.bit_rate.map(u64::from).unwrap_or(0),
            size: song.size.unwrap_or(0),
            year: song.year,
        }
    }
}

/// Ids arrive as strings from most servers and as numbers from a few.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Numeric field that may be a number, a numeric string, `""` or absent.
fn deserialize_lenient_number<'de, D, N>(deserializer: D) -> Result<Option<N>, D::Error>
where
    D: Deserializer<'de>,
    N: Deserialize<'de> + FromStr,
    N::Err: fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText<T> {
        Number(T),
        Text(String),
    }

    match Option::<NumberOrText<N>>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
        None => Ok(None),
    }
}
