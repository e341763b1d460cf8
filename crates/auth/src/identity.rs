use std::time::Duration;

use async_trait::async_trait;
use chorely_config::FirebaseConfig;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::refresh::TokenExchange;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("firebase identity is not configured")]
    NotConfigured,
    #[error("identity provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("identity request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("identity response was malformed: {0}")]
    Decode(String),
}

/// Tokens returned by a successful refresh-token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedTokens {
    pub uid: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in_seconds: u64,
}

/// Firebase account resolved from an ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseAccount {
    pub uid: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Resolves the Firebase account behind an ID token.
#[async_trait]
pub trait AccountLookup: Send + Sync {
    /// An invalid or expired token is [`IdentityError::Rejected`].
    async fn lookup(&self, id_token: &str) -> Result<FirebaseAccount, IdentityError>;
}

/// Client for the Identity Toolkit and Secure Token REST APIs.
#[derive(Clone)]
pub struct FirebaseIdentity {
    http: Client,
    api_key: String,
    identity_base_url: String,
    securetoken_base_url: String,
}

impl FirebaseIdentity {
    pub fn new(config: &FirebaseConfig) -> Result<Self, IdentityError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(IdentityError::NotConfigured)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self::with_http(
            http,
            api_key,
            &config.identity_base_url,
            &config.securetoken_base_url,
        ))
    }

    pub fn with_http(
        http: Client,
        api_key: &str,
        identity_base_url: &str,
        securetoken_base_url: &str,
    ) -> Self {
        Self {
            http,
            api_key: api_key.to_owned(),
            identity_base_url: identity_base_url.trim_end_matches('/').to_owned(),
            securetoken_base_url: securetoken_base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl AccountLookup for FirebaseIdentity {
    async fn lookup(&self, id_token: &str) -> Result<FirebaseAccount, IdentityError> {
        let response = self
            .http
            .post(format!("{}/v1/accounts:lookup", self.identity_base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "idToken": id_token }))
            .send()
            .await?;

        let body: LookupResponse = decode(response).await?;
        let user = body
            .users
            .into_iter()
            .next()
            .ok_or_else(|| IdentityError::Decode("lookup returned no users".into()))?;

        debug!(uid = %user.local_id, "resolved firebase account");

        Ok(FirebaseAccount {
            uid: user.local_id,
            email: user.email.filter(|email| !email.is_empty()),
            email_verified: user.email_verified,
            name: user.display_name.filter(|name| !name.is_empty()),
            picture: user.photo_url.filter(|url| !url.is_empty()),
        })
    }
}

#[async_trait]
impl TokenExchange for FirebaseIdentity {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, IdentityError> {
        let response = self
            .http
            .post(format!("{}/v1/token", self.securetoken_base_url))
            .query(&[("key", self.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        let body: SecureTokenResponse = decode(response).await?;
        debug!(uid = %body.user_id, "exchanged firebase refresh token");

        Ok(RefreshedTokens {
            uid: body.user_id,
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_in_seconds: body.expires_in.parse().unwrap_or(3_600),
        })
    }
}

async fn decode<T>(response: Response) -> Result<T, IdentityError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|envelope| envelope.error.message)
            .unwrap_or(text);
        warn!(status = status.as_u16(), message = %message, "identity request rejected");
        return Err(IdentityError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|error| IdentityError::Decode(error.to_string()))
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    display_name: Option<String>,
    photo_url: Option<String>,
}

#[derive(Deserialize)]
struct SecureTokenResponse {
    id_token: String,
    refresh_token: String,
    user_id: String,
    #[serde(default)]
    expires_in: String,
}
