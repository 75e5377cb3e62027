use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::ResolveError;

pub const STICKY_SESSION_TTL: Duration = Duration::from_secs(10 * 60);
pub const REQUEST_TIMEOUT_SECONDS: u64 = 60;
/// Upper bound on how many backend results are scored per search.
pub const MAX_CONSIDERED_RESULTS: usize = 10;
pub const CLIENT_NAME: &str = "subresolve";
pub const USER_AGENT: &str = concat!("subresolve/", env!("CARGO_PKG_VERSION"));
pub const SOURCE_TAG: &str = "OpenSubsonic";

/// Overrides the accounts file location.
pub const ACCOUNTS_ENV_VAR: &str = "SUBRESOLVE_ACCOUNTS";

pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("subresolve")
}

pub fn get_accounts_file_path() -> PathBuf {
    get_config_dir().join("accounts.json")
}

/// One OpenSubsonic account from the accounts file.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub base_url: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub accounts_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub client_name: String,
    /// Order results by release year before scoring, oldest first.
    pub prefer_earliest_release: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            accounts_path: get_accounts_file_path(),
            request_timeout_secs: REQUEST_TIMEOUT_SECONDS,
            user_agent: USER_AGENT.to_string(),
            client_name: CLIENT_NAME.to_string(),
            prefer_earliest_release: true,
        }
    }
}

impl ResolverConfig {
    pub fn with_accounts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.accounts_path = path.into();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn parse_credentials(json: &str) -> Result<Vec<Credential>, ResolveError> {
    Ok(serde_json::from_str(json)?)
}

pub fn read_credentials(path: &Path) -> Result<Vec<Credential>, ResolveError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ResolveError::Config(format!("{}: {}", path.display(), e)))?;
    parse_credentials(&content)
}

/// Read the accounts file; any failure is logged and yields no credentials.
pub fn load_credentials(path: &Path) -> Vec<Credential> {
    match read_credentials(path) {
        Ok(credentials) => {
            log::info!(
                "Loaded {} account(s) from {}",
                credentials.len(),
                path.display()
            );
            credentials
        }
        Err(e) => {
            log::error!("Failed to load accounts from {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credentials() {
        let json = r#"[
            {"username": "alice", "password": "secret", "baseUrl": "https://music.example.org"},
            {"username": "bob", "password": "hunter2", "baseUrl": "http://10.0.0.2:4533/"}
        ]"#;

        let credentials = parse_credentials(json).unwrap();
        assert_eq!(credentials.len(), 2);
        assert_eq!(credentials[0].username, "alice");
        assert_eq!(credentials[1].base_url, "http://10.0.0.2:4533/");
    }

    #[test]
    fn test_decode_failure() {
        let err = parse_credentials(r#"{"username": "alice"}"#).unwrap_err();
        assert!(matches!(err, ResolveError::CredentialDecode(_)));
    }

    #[test]
    fn test_missing_file_yields_no_credentials() {
        let path = std::env::temp_dir().join("subresolve-missing-accounts.json");
        assert!(load_credentials(&path).is_empty());
        assert!(matches!(read_credentials(&path), Err(ResolveError::Config(_))));
    }

    #[test]
    fn test_load_credentials_from_file() {
        let path = std::env::temp_dir().join(format!(
            "subresolve-accounts-{}.json",
            std::process::id()
        ));
        fs::write(
            &path,
            r#"[{"username": "alice", "password": "pw", "baseUrl": "https://a.example"}]"#,
        )
        .unwrap();

        let credentials = load_credentials(&path);
        let _ = fs::remove_file(&path);
        assert_eq!(credentials.len(), 1);
        assert_eq!(credentials[0].base_url, "https://a.example");
    }

    #[test]
    fn test_credential_debug_hides_password() {
        let credential = Credential {
            username: "alice".into(),
            password: "secret".into(),
            base_url: "https://a.example".into(),
        };
        assert!(!format!("{:?}", credential).contains("secret"));
    }
}
