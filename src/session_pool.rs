//! Pool of authenticated catalog sessions.
//!
//! A lookup reuses the session picked last as long as it was picked within
//! the sticky TTL; otherwise a session is drawn uniformly at random. The
//! check, the draw and the bookkeeping all happen under one lock owned by
//! the pool, so concurrent lookups never race on the sticky slot.

use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::{load_credentials, ResolverConfig, STICKY_SESSION_TTL};
use crate::errors::ResolveError;
use crate::providers::CatalogSession;
use crate::subsonic::SubsonicSession;

#[derive(Debug, Clone, Copy)]
struct LastUsed {
    index: usize,
    at: Instant,
}

pub struct SessionPool {
    sessions: Vec<Arc<dyn CatalogSession>>,
    last_used: Mutex<Option<LastUsed>>,
    ttl: Duration,
}

impl SessionPool {
    pub fn new(sessions: Vec<Arc<dyn CatalogSession>>) -> Self {
        Self {
            sessions,
            last_used: Mutex::new(None),
            ttl: STICKY_SESSION_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Load the accounts file and authenticate every account.
    ///
    /// Accounts that fail to authenticate are logged and left out. A missing
    /// or malformed accounts file gives an empty pool.
    pub async fn connect(config: &ResolverConfig) -> Self {
        let credentials = load_credentials(&config.accounts_path);
        let mut sessions: Vec<Arc<dyn CatalogSession>> = Vec::with_capacity(credentials.len());

        for credential in &credentials {
            match SubsonicSession::connect(credential, config).await {
                Ok(session) => {
                    log::info!("Authenticated session {}", session.id());
                    sessions.push(Arc::new(session));
                }
                Err(e) => {
                    log::warn!(
                        "Skipping account {}@{}: {}",
                        credential.username,
                        credential.base_url,
                        e
                    );
                }
            }
        }

        if sessions.is_empty() {
            log::warn!("No catalog sessions available, every lookup will come back empty");
        } else {
            log::info!(
                "Session pool ready with {}/{} account(s)",
                sessions.len(),
                credentials.len()
            );
        }

        Self::new(sessions)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Pick the session for one lookup.
    pub fn acquire(&self) -> Result<Arc<dyn CatalogSession>, ResolveError> {
        let mut last_used = self.last_used.lock();
        let now = Instant::now();

        if let Some(last) = *last_used {
            if now.duration_since(last.at) < self.ttl {
                return Ok(self.sessions[last.index].clone());
            }
        }

        if self.sessions.is_empty() {
            return Err(ResolveError::NoSessionsAvailable);
        }

        let index = rand::rng().random_range(0..self.sessions.len());
        *last_used = Some(LastUsed { index, at: now });
        log::debug!("Selected session {}", self.sessions[index].id());

        Ok(self.sessions[index].clone())
    }
}
