use std::future::Future;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::identity::{IdentityError, RefreshedTokens};
use crate::session::FirebaseTokens;

/// Exchanges a Firebase refresh token for a fresh ID token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, IdentityError>;
}

/// Errors that can tell whether the remote side rejected the caller's token.
pub trait AuthFailure {
    fn is_unauthorized(&self) -> bool;
}

#[derive(Debug, Error)]
pub enum TokenRefreshError {
    #[error("firebase session can no longer be refreshed: {0}")]
    Rejected(String),
    #[error("refreshed token belongs to {actual}, expected {expected}")]
    IdentityMismatch { expected: String, actual: String },
    #[error("token exchange failed: {0}")]
    Exchange(IdentityError),
}

/// The Firebase tokens of one request, updated in place when refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseCredentials {
    pub uid: String,
    pub id_token: String,
    pub refresh_token: String,
    refreshed: bool,
}

impl FirebaseCredentials {
    pub fn new(
        uid: impl Into<String>,
        id_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            id_token: id_token.into(),
            refresh_token: refresh_token.into(),
            refreshed: false,
        }
    }

    pub fn from_tokens(uid: impl Into<String>, tokens: &FirebaseTokens) -> Self {
        Self::new(uid, tokens.id_token.clone(), tokens.refresh_token.clone())
    }

    /// True once a refresh replaced the tokens this value started with.
    pub fn was_refreshed(&self) -> bool {
        self.refreshed
    }

    pub fn tokens(&self) -> FirebaseTokens {
        FirebaseTokens {
            id_token: self.id_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

/// Runs `operation` with the current ID token, refreshing and retrying once
/// when it fails as unauthorized. Any other failure is returned unchanged.
pub async fn with_token_refresh<T, E, F, Fut>(
    exchange: &dyn TokenExchange,
    credentials: &mut FirebaseCredentials,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: AuthFailure + From<TokenRefreshError>,
{
    match operation(credentials.id_token.clone()).await {
        Err(error) if error.is_unauthorized() => {
            debug!(uid = %credentials.uid, "id token rejected, refreshing");
        }
        result => return result,
    }

    refresh_credentials(exchange, credentials).await?;
    operation(credentials.id_token.clone()).await
}

pub async fn refresh_credentials(
    exchange: &dyn TokenExchange,
    credentials: &mut FirebaseCredentials,
) -> Result<(), TokenRefreshError> {
    if credentials.refresh_token.is_empty() {
        return Err(TokenRefreshError::Rejected("missing refresh token".into()));
    }

    let refreshed = exchange
        .refresh(&credentials.refresh_token)
        .await
        .map_err(|error| match error {
            IdentityError::Rejected { .. } => TokenRefreshError::Rejected(error.to_string()),
            other => TokenRefreshError::Exchange(other),
        })?;

    if refreshed.uid != credentials.uid {
        warn!(
            expected = %credentials.uid,
            actual = %refreshed.uid,
            "refreshed firebase token belongs to another user"
        );
        return Err(TokenRefreshError::IdentityMismatch {
            expected: credentials.uid.clone(),
            actual: refreshed.uid,
        });
    }

    credentials.id_token = refreshed.id_token;
    credentials.refresh_token = refreshed.refresh_token;
    credentials.refreshed = true;
    info!(uid = %credentials.uid, "refreshed firebase id token");
    Ok(())
}
