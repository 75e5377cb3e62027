use crate::config::{Credential, ResolverConfig, SOURCE_TAG};
use crate::models::{Quality, RawTrack};
use crate::providers::traits::CatalogSession;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::models::*;

const API_VERSION: &str = "1.13.0";

/// One authenticated OpenSubsonic account.
pub struct SubsonicSession {
    client: Client,
    id: String,
    server_url: String,
    username: String,
    password: String,
    client_name: String,
    use_legacy_auth: bool,
}

impl SubsonicSession {
    pub fn new(credential: &Credential, config: &ResolverConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        let server_url = credential.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            id: format!("{}@{}", credential.username, server_url),
            server_url,
            username: credential.username.clone(),
            password: credential.password.clone(),
            client_name: config.client_name.clone(),
            use_legacy_auth: false,
        })
    }

    /// Build a session and verify the credentials against the server.
    pub async fn connect(credential: &Credential, config: &ResolverConfig) -> Result<Self> {
        let mut session = Self::new(credential, config)?;
        session.authenticate().await?;
        Ok(session)
    }

    fn generate_salt() -> String {
        let mut rng = rand::rng();
        let random_bytes: Vec<u8> = (0..16).map(|_| rng.random::<u8>()).collect();
        hex::encode(random_bytes)
    }

    fn token(password: &str, salt: &str) -> String {
        format!("{:x}", md5::compute(format!("{}{}", password, salt).as_bytes()))
    }

    fn build_auth_params(&self) -> String {
        if self.use_legacy_auth {
            format!(
                "c={}&f=json&v={}&u={}&p={}",
                urlencoding::encode(&self.client_name),
                API_VERSION,
                urlencoding::encode(&self.username),
                urlencoding::encode(&self.password)
            )
        } else {
            let salt = Self::generate_salt();
            format!(
                "c={}&f=json&v={}&u={}&s={}&t={}",
                urlencoding::encode(&self.client_name),
                API_VERSION,
                urlencoding::encode(&self.username),
                salt,
                Self::token(&self.password, &salt)
            )
        }
    }

    fn build_url(&self, endpoint: &str, extra_params: &str) -> String {
        let auth = self.build_auth_params();
        if extra_params.is_empty() {
            format!("{}/rest/{}?{}", self.server_url, endpoint, auth)
        } else {
            format!("{}/rest/{}?{}&{}", self.server_url, endpoint, auth, extra_params)
        }
    }

    /// GET an endpoint and unwrap the `subsonic-response` envelope.
    async fn call<T: DeserializeOwned>(&self, endpoint: &str, extra_params: &str) -> Result<Option<T>> {
        let url = self.build_url(endpoint, extra_params);
        let resp: SubsonicResponse<T> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if resp.subsonic_response.status == "ok" {
            Ok(resp.subsonic_response.data)
        } else if let Some(err) = resp.subsonic_response.error {
            Err(anyhow!("Subsonic {} error {}: {}", endpoint, err.code, err.message))
        } else {
            Err(anyhow!("Unknown Subsonic error from {}", endpoint))
        }
    }

    pub async fn ping(&self) -> Result<()> {
        self.call::<EmptyData>("ping", "").await?;
        Ok(())
    }

    /// Try token auth first and fall back to legacy password auth.
    pub async fn authenticate(&mut self) -> Result<()> {
        if !self.use_legacy_auth {
            match self.ping().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    log::debug!("Token auth failed for {}: {}, trying legacy auth", self.id, e);
                    self.use_legacy_auth = true;
                }
            }
        }
        self.ping().await
    }

    async fn scrobble(&self, track_id: &str, timestamp_ms: i64, submission: bool) -> Result<()> {
        self.call::<EmptyData>(
            "scrobble",
            &format!(
                "id={}&time={}&submission={}",
                urlencoding::encode(track_id),
                timestamp_ms,
                submission
            ),
        )
        .await?;
        Ok(())
    }

    fn stream_params(quality: Quality) -> (&'static str, u32) {
        match quality {
            Quality::LOSSLESS => ("raw", 0),
            Quality::HIGH => ("mp3", 320),
            Quality::LOW => ("mp3", 128),
        }
    }
}

#[async_trait]
impl CatalogSession for SubsonicSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn source(&self) -> &str {
        SOURCE_TAG
    }

    async fn search(&self, keyword: &str) -> Result<Vec<RawTrack>> {
        log::info!("Subsonic search on {} for: '{}'", self.id, keyword);

        let data: Option<SearchResult2Data> = self
            .call(
                "search2",
                &format!(
                    "query={}&artistCount=0&albumCount=0",
                    urlencoding::encode(keyword)
                ),
            )
            .await?;

        let songs = data
            .and_then(|d| d.search_result2)
            .unwrap_or_default()
            .song;

        log::debug!("Subsonic search2 returned {} songs", songs.len());

        Ok(songs.into_iter().map(RawTrack::from).collect())
    }

    async fn resolve_stream_url(&self, track_id: &str, quality: Quality) -> Result<String> {
        let (format, max_bit_rate) = Self::stream_params(quality);
        Ok(self.build_url(
            "stream",
            &format!(
                "id={}&maxBitRate={}&format={}",
                urlencoding::encode(track_id),
                max_bit_rate,
                format
            ),
        ))
    }

    async fn signal_play_started(&self, track_id: &str, timestamp_ms: i64) -> Result<()> {
        self.scrobble(track_id, timestamp_ms, false).await
    }

    async fn signal_play_finished(&self, track_id: &str, timestamp_ms: i64) -> Result<()> {
        self.scrobble(track_id, timestamp_ms, true).await
    }
}
