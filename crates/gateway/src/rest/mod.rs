//! REST API endpoints for the gateway

pub mod auth;
pub mod chores;
pub mod cosmetics;
pub mod family;
pub mod health;
pub mod invitations;

use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chorely_chores::{ChoreResult, Db};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::session::{persist_refreshed, Caller};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FamilyIdQuery {
    pub family_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn new() -> Self {
        Self { ok: true }
    }
}

impl Default for OkResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Finishes a request that ran against the document store: re-issues the
/// session cookie if the Firebase tokens were refreshed, then renders the
/// service result. The cookie is kept on error responses too.
pub(crate) fn respond<T: Serialize>(
    state: &AppState,
    jar: CookieJar,
    caller: &Caller,
    db: Db<'_>,
    result: ChoreResult<T>,
) -> Result<Response, ApiError> {
    let jar = persist_refreshed(state, jar, caller, db.credentials())?;
    Ok(match result {
        Ok(body) => (jar, Json(body)).into_response(),
        Err(error) => (jar, ApiError::from(error)).into_response(),
    })
}
