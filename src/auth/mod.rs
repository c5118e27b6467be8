//! Credential provider for the Google APIs.
//!
//! Tokens live in an authorized-user JSON file (the same shape the Google
//! client libraries write as `token.json`). The [`TokenStore`] trait splits
//! the stateful disk resource into `load`/`save` so the rest of the crate
//! only ever sees [`Authenticator::access_token`].
//!
//! There is no interactive consent flow: a missing or unrefreshable token
//! file is an [`AuthError`], and the operator is expected to seed the file
//! out of band.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AuthError, AuthResult};

/// OAuth scopes the dashboard needs: read spreadsheet values and resolve
/// documents by name through Drive.
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets.readonly",
    "https://www.googleapis.com/auth/drive.readonly",
];

/// Refresh slightly before the recorded expiry to absorb clock skew.
const EXPIRY_MARGIN_SECS: i64 = 60;

// =============================================================================
// Stored token
// =============================================================================

/// An authorized-user credential, as persisted on disk.
///
/// Field names follow the Google authorized-user file format so an existing
/// `token.json` works unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    /// Current access token.
    #[serde(rename = "token")]
    pub access_token: String,
    /// Long-lived refresh token, if the consent flow granted one.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// OAuth token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Access token expiry; absent means "assume still valid".
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl StoredToken {
    /// Whether the access token is still usable at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry - Duration::seconds(EXPIRY_MARGIN_SECS) > now,
            None => true,
        }
    }
}

// =============================================================================
// Token store
// =============================================================================

/// Load/save interface over the persisted credential.
pub trait TokenStore {
    fn load(&self) -> AuthResult<StoredToken>;
    fn save(&self, token: &StoredToken) -> AuthResult<()>;
}

/// Token store backed by a JSON file on disk.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> AuthResult<StoredToken> {
        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn save(&self, token: &StoredToken) -> AuthResult<()> {
        let content = serde_json::to_string_pretty(token)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

// =============================================================================
// Authenticator
// =============================================================================

/// Successful response from the OAuth token endpoint.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Error response from the OAuth token endpoint.
#[derive(Debug, Deserialize)]
struct RefreshErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Supplies a valid access token, refreshing and re-persisting it when the
/// stored one has expired.
pub struct Authenticator<S: TokenStore> {
    store: S,
    http: reqwest::Client,
}

impl<S: TokenStore> Authenticator<S> {
    pub fn new(store: S, http: reqwest::Client) -> Self {
        Self { store, http }
    }

    /// Return a valid bearer token for [`SCOPES`].
    ///
    /// Loads the stored token, returns it if still fresh, otherwise refreshes
    /// through the token endpoint and saves the result before returning it.
    pub async fn access_token(&self) -> AuthResult<String> {
        let token = self.store.load()?;

        if token.is_fresh(Utc::now()) {
            return Ok(token.access_token);
        }

        let refreshed = self.refresh(token).await?;
        self.store.save(&refreshed)?;
        Ok(refreshed.access_token)
    }

    /// Exchange the refresh token for a new access token.
    async fn refresh(&self, mut token: StoredToken) -> AuthResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or(AuthError::NotRefreshable)?;

        println!("   🔑 Refreshing access token...");

        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", token.client_id.as_str()),
            ("client_secret", token.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
        ];

        let response = self
            .http
            .post(&token.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::RefreshFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::RefreshFailed(e.to_string()))?;

        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<RefreshErrorResponse>(&body) {
                let detail = err.error_description.unwrap_or_default();
                return Err(AuthError::RefreshFailed(format!("{} {}", err.error, detail)));
            }
            return Err(AuthError::RefreshFailed(format!("HTTP {}: {}", status, body)));
        }

        let refreshed: RefreshResponse = serde_json::from_str(&body)
            .map_err(|e| AuthError::RefreshFailed(format!("invalid response: {}", e)))?;

        token.access_token = refreshed.access_token;
        token.expiry = refreshed
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));

        Ok(token)
    }
}
