//! Authentication REST endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chorely_auth::{FirebaseCredentials, Session, UserRole};
use chorely_chores::types::SignInOutcome;
use chorely_chores::AccountService;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::rest::OkResponse;
use crate::session::{clear_session, issue_session, require_session};
use crate::state::AppState;

/// Tokens from a completed client-side Firebase sign-in.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallbackRequest {
    pub id_token: String,
    pub refresh_token: String,
    /// Household role for a first sign-in, `parent` or `child`.
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub uid: String,
    #[schema(example = "parent")]
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            uid: session.uid,
            role: session.role.as_str().to_string(),
            email: session.email,
            name: session.name,
            picture: session.picture,
            expires_at: session.expires_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/callback",
    tag = "Auth",
    request_body = CallbackRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = SignInOutcome),
        (status = 400, description = "Invalid payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Firebase rejected the ID token", body = crate::error::ErrorResponse),
        (status = 503, description = "Firebase not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<CallbackRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<SignInOutcome>), ApiError> {
    let Json(request) = payload?;
    if request.id_token.trim().is_empty() || request.refresh_token.trim().is_empty() {
        return Err(ApiError::bad_request());
    }
    let role = match request.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => Some(UserRole::parse(raw).ok_or_else(|| ApiError::new("invalid_role"))?),
        None => None,
    };

    let firebase = state.firebase()?;
    let account = firebase.accounts().lookup(&request.id_token).await?;

    let mut db = firebase.db(FirebaseCredentials::new(
        account.uid.clone(),
        request.id_token,
        request.refresh_token,
    ));
    let outcome = AccountService::new(&mut db).sign_in(&account, role).await?;

    let session = Session {
        uid: account.uid.clone(),
        role: outcome.user.role,
        email: outcome.user.email.clone(),
        email_verified: account.email_verified,
        name: account.name.clone(),
        picture: account.picture.clone(),
        firebase: db.credentials().tokens(),
        expires_at: None,
    };
    let jar = issue_session(&state, jar, &session)?;

    info!(
        uid = %account.uid,
        joined = outcome.joined_family_ids.len(),
        "signed in"
    );
    Ok((jar, Json(outcome)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Session cookie cleared", body = OkResponse)
    )
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<OkResponse>) {
    (clear_session(&state, jar), Json(OkResponse::new()))
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "Auth",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "No valid session", body = crate::error::ErrorResponse)
    )
)]
pub async fn session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<SessionResponse>, ApiError> {
    let caller = require_session(&state, &jar)?;
    Ok(Json(SessionResponse::from(caller.session)))
}
