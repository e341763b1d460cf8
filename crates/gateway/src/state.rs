//! Shared application state for the gateway

use std::sync::Arc;

use chorely_auth::{AccountLookup, FirebaseCredentials, SessionCodec, TokenExchange};
use chorely_chores::Db;
use chorely_config::SessionConfig;
use chorely_firestore::DocumentStore;

use crate::error::ApiError;

/// Remote Firebase services. Absent when the project is not configured.
#[derive(Clone)]
pub struct FirebaseBackend {
    store: Arc<dyn DocumentStore>,
    exchange: Arc<dyn TokenExchange>,
    accounts: Arc<dyn AccountLookup>,
}

impl FirebaseBackend {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        exchange: Arc<dyn TokenExchange>,
        accounts: Arc<dyn AccountLookup>,
    ) -> Self {
        Self {
            store,
            exchange,
            accounts,
        }
    }

    pub fn accounts(&self) -> &dyn AccountLookup {
        self.accounts.as_ref()
    }

    /// Document access for one request, acting with `credentials`.
    pub fn db(&self, credentials: FirebaseCredentials) -> Db<'_> {
        Db::new(self.store.as_ref(), self.exchange.as_ref(), credentials)
    }
}

#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
}

impl From<&SessionConfig> for CookieSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            secure: config.secure_cookie,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    sessions: SessionCodec,
    cookie: CookieSettings,
    firebase: Option<FirebaseBackend>,
}

impl AppState {
    pub fn new(
        sessions: SessionCodec,
        cookie: CookieSettings,
        firebase: Option<FirebaseBackend>,
    ) -> Self {
        Self {
            sessions,
            cookie,
            firebase,
        }
    }

    pub fn sessions(&self) -> &SessionCodec {
        &self.sessions
    }

    pub fn cookie(&self) -> &CookieSettings {
        &self.cookie
    }

    /// The Firebase backend, or `not_configured`.
    pub fn firebase(&self) -> Result<&FirebaseBackend, ApiError> {
        self.firebase.as_ref().ok_or_else(ApiError::not_configured)
    }
}
