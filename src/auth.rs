//! Calendar credentials.
//!
//! The interactive consent flow happens elsewhere; this module only picks up
//! what it left behind. A token in `JAYSCAL_ACCESS_TOKEN` is used as-is.
//! Otherwise the persisted token file is loaded and, when the access token has
//! expired, refreshed through Google's token endpoint and written back.
use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, TimeDelta, Utc};
use directories::ProjectDirs;
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const ACCESS_TOKEN_ENV: &str = "JAYSCAL_ACCESS_TOKEN";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
/// Refresh this long before the recorded expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl StoredToken {
    /// Tokens without an expiry are trusted until the calendar rejects them.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|at| at - TimeDelta::seconds(EXPIRY_MARGIN_SECS) <= now)
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

pub struct TokenStore {
    path: PathBuf,
    token_url: String,
    client: Client,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            token_url: GOOGLE_TOKEN_ENDPOINT.to_owned(),
            client: Client::new(),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// `token.json` in the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "jayscal").map(|dirs| dirs.config_dir().join("token.json"))
    }

    pub fn load(&self) -> Result<StoredToken> {
        let content = std::fs::read_to_string(&self.path).with_context(|| {
            format!(
                "no calendar credentials at {} (complete the OAuth consent flow or set {ACCESS_TOKEN_ENV})",
                self.path.display()
            )
        })?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid token file {}", self.path.display()))
    }

    /// Write the token file readable by the owner only; it holds the refresh
    /// token and client secret.
    pub fn save(&self, token: &StoredToken) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mut file = owner_only_file(&self.path)
            .with_context(|| format!("could not open {}", self.path.display()))?;
        file.write_all(serde_json::to_string_pretty(token)?.as_bytes())
            .with_context(|| format!("could not write {}", self.path.display()))
    }

    /// A currently valid access token, refreshing and persisting if needed.
    pub async fn access_token(&self) -> Result<String> {
        let token = self.load()?;
        let now = Utc::now();
        if !token.is_expired(now) {
            debug!("using stored access token from {}", self.path.display());
            return Ok(token.access_token);
        }

        info!("access token expired, refreshing");
        let refreshed = self.refresh(&token, now).await?;
        self.save(&refreshed)?;
        Ok(refreshed.access_token)
    }

    async fn refresh(&self, token: &StoredToken, now: DateTime<Utc>) -> Result<StoredToken> {
        let (Some(refresh_token), Some(client_id), Some(client_secret)) =
            (&token.refresh_token, &token.client_id, &token.client_secret)
        else {
            bail!(
                "access token in {} expired and cannot be refreshed (missing refresh token or client credentials)",
                self.path.display()
            );
        };

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ])
            .send()
            .await
            .context("token refresh request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("token refresh rejected with HTTP {status}"));
        }
        let fresh: RefreshResponse = response.json().await.context("unreadable token refresh response")?;

        Ok(StoredToken {
            access_token: fresh.access_token,
            refresh_token: fresh.refresh_token.or_else(|| token.refresh_token.clone()),
            expires_at: fresh.expires_in.map(|secs| now + TimeDelta::seconds(secs)),
            client_id: token.client_id.clone(),
            client_secret: token.client_secret.clone(),
        })
    }
}

#[cfg(unix)]
fn owner_only_file(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten files left by older runs.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn owner_only_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

/// Produce an access token for this run: environment first, then the token file.
pub async fn acquire_access_token(token_file: Option<&Path>) -> Result<String> {
    if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV)
        && !token.trim().is_empty()
    {
        debug!("using access token from {ACCESS_TOKEN_ENV}");
        return Ok(token.trim().to_owned());
    }

    let path = token_file
        .map(Path::to_path_buf)
        .or_else(TokenStore::default_path)
        .ok_or_else(|| anyhow!("no config directory for the token file; pass --token-file"))?;
    TokenStore::new(path).access_token().await
}
