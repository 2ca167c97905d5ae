//! Google credentials and OAuth2 access tokens.
//!
//! Two credential kinds are accepted, matching the `type` field of the JSON
//! files Google issues:
//! - `service_account`: a signed RS256 JWT is exchanged for an access token
//! - `authorized_user`: a refresh token is exchanged for an access token
//!
//! Tokens are cached per [`TokenProvider`] until shortly before they expire.

use std::time::{Duration, Instant};

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::DriveError;
use crate::{CatalogError, Result};

/// OAuth2 scope requested for Drive access.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

/// Google's OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for service account assertions.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before their reported expiry.
const EXPIRY_LEEWAY: Duration = Duration::from_secs(60);

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Service account key file contents.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account e-mail, used as the JWT issuer.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// Key id, sent as the JWT `kid` header.
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// Token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// Authorized user (refresh token) credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUser {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// Parsed credentials blob.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    /// `"type": "service_account"`
    ServiceAccount(ServiceAccountKey),
    /// `"type": "authorized_user"`
    AuthorizedUser(AuthorizedUser),
}

impl Credentials {
    /// Parse a credentials JSON blob.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CatalogError::ClientInitFailed(e.to_string()))
    }

    /// Token endpoint these credentials are exchanged at.
    pub fn token_uri(&self) -> &str {
        match self {
            Credentials::ServiceAccount(key) => &key.token_uri,
            Credentials::AuthorizedUser(user) => &user.token_uri,
        }
    }
}

/// JWT claims of a service account assertion.
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

enum Grant {
    ServiceAccount {
        client_email: String,
        key: EncodingKey,
        key_id: Option<String>,
        token_uri: String,
    },
    RefreshToken(AuthorizedUser),
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Mints and caches OAuth2 access tokens.
pub struct TokenProvider {
    http: Client,
    grant: Grant,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// Create a provider, validating the private key up front.
    pub fn new(http: Client, credentials: Credentials) -> Result<Self> {
        let grant = match credentials {
            Credentials::ServiceAccount(sa) => {
                let key = EncodingKey::from_rsa_pem(sa.private_key.as_bytes()).map_err(|e| {
                    CatalogError::ClientInitFailed(format!("invalid private key: {e}"))
                })?;
                Grant::ServiceAccount {
                    client_email: sa.client_email,
                    key,
                    key_id: sa.private_key_id,
                    token_uri: sa.token_uri,
                }
            }
            Credentials::AuthorizedUser(user) => Grant::RefreshToken(user),
        };

        Ok(Self {
            http,
            grant,
            cached: Mutex::new(None),
        })
    }

    /// Return a valid access token, fetching a new one when needed.
    pub async fn access_token(&self) -> std::result::Result<String, DriveError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let response = self.fetch_token().await?;
        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(EXPIRY_LEEWAY);
        tracing::debug!(expires_in = response.expires_in, "Obtained Drive access token");

        *cached = Some(CachedToken {
            value: response.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(response.access_token)
    }

    async fn fetch_token(&self) -> std::result::Result<TokenResponse, DriveError> {
        let request = match &self.grant {
            Grant::ServiceAccount {
                client_email,
                key,
                key_id,
                token_uri,
            } => {
                let assertion = sign_assertion(client_email, key, key_id.as_deref(), token_uri)?;
                self.http.post(token_uri).form(&[
                    ("grant_type", JWT_BEARER_GRANT),
                    ("assertion", assertion.as_str()),
                ])
            }
            Grant::RefreshToken(user) => self.http.post(&user.token_uri).form(&[
                ("grant_type", "refresh_token"),
                ("client_id", user.client_id.as_str()),
                ("client_secret", user.client_secret.as_str()),
                ("refresh_token", user.refresh_token.as_str()),
            ]),
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let reason = serde_json::from_slice::<TokenErrorResponse>(&body)
                .map(|e| match e.error_description {
                    Some(description) => format!("{}: {}", e.error, description),
                    None => e.error,
                })
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(DriveError::Auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                reason
            )));
        }

        serde_json::from_slice(&body)
            .map_err(|e| DriveError::Auth(format!("malformed token response: {e}")))
    }
}

fn sign_assertion(
    client_email: &str,
    key: &EncodingKey,
    key_id: Option<&str>,
    token_uri: &str,
) -> std::result::Result<String, DriveError> {
    let iat = Utc::now().timestamp();
    let claims = AssertionClaims {
        iss: client_email,
        scope: DRIVE_READONLY_SCOPE,
        aud: token_uri,
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key_id.map(str::to_string);

    encode(&header, &claims, key).map_err(|e| DriveError::Auth(format!("failed to sign JWT: {e}")))
}
