//! Cookie-based authentication.
//!
//! The session cookie carries a signed [`Session`]. Handlers turn it into a
//! [`Caller`], run their services with the caller's Firebase credentials and
//! re-issue the cookie when those credentials were refreshed on the way.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chorely_auth::{FirebaseCredentials, Session};
use chorely_chores::Actor;
use chrono::Utc;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated user of one request.
#[derive(Debug, Clone)]
pub struct Caller {
    pub session: Session,
    pub actor: Actor,
}

impl Caller {
    pub fn from_session(session: Session) -> Self {
        let actor = Actor {
            uid: session.uid.clone(),
            email: session.email.clone(),
            email_verified: session.email_verified,
            name: session.name.clone(),
            picture: session.picture.clone(),
        };
        Self { session, actor }
    }

    pub fn credentials(&self) -> FirebaseCredentials {
        FirebaseCredentials::from_tokens(&self.session.uid, &self.session.firebase)
    }
}

/// Decodes the session cookie. Missing, tampered or expired cookies are
/// `unauthorized`.
pub fn require_session(state: &AppState, jar: &CookieJar) -> Result<Caller, ApiError> {
    let token = jar
        .get(&state.cookie().name)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .ok_or_else(ApiError::unauthorized)?;

    let session = state.sessions().decode(token).ok_or_else(|| {
        debug!("session cookie rejected");
        ApiError::unauthorized()
    })?;
    Ok(Caller::from_session(session))
}

/// Signs `session` with a fresh expiry and stores it in the jar.
pub fn issue_session(state: &AppState, jar: CookieJar, session: &Session) -> Result<CookieJar, ApiError> {
    let token = state.sessions().encode(session)?;
    Ok(jar.add(session_cookie(state, token)))
}

/// Re-issues the caller's cookie with refreshed Firebase tokens. The session
/// keeps its original expiry.
pub fn persist_refreshed(
    state: &AppState,
    jar: CookieJar,
    caller: &Caller,
    credentials: &FirebaseCredentials,
) -> Result<CookieJar, ApiError> {
    if !credentials.was_refreshed() {
        return Ok(jar);
    }

    let mut session = caller.session.clone();
    session.firebase = credentials.tokens();
    let expires_at = session
        .expires_at
        .unwrap_or_else(|| Utc::now() + state.sessions().ttl());
    let token = state.sessions().encode_with_expiry(&session, expires_at)?;

    info!(uid = %session.uid, "re-issued session cookie with refreshed firebase tokens");
    Ok(jar.add(session_cookie(state, token)))
}

pub fn clear_session(state: &AppState, jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((state.cookie().name.clone(), "")).path("/"))
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((state.cookie().name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(state.cookie().secure)
        .same_site(SameSite::Lax)
        .build()
}
