//! Invitation REST endpoints

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chorely_chores::types::{ClaimInvitationRequest, InviteRequest, RevokeInvitationQuery};
use chorely_chores::InviteService;

use crate::error::ApiError;
use crate::rest::{respond, OkResponse};
use crate::session::require_session;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/invitations",
    tag = "Invitations",
    responses(
        (status = 200, description = "Pending invitations for the caller's email", body = Vec<chorely_chores::PendingInvitation>),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_invitations(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;

    let mut db = state.firebase()?.db(caller.credentials());
    let result = InviteService::new(&mut db).pending_for(&caller.actor).await;
    respond(&state, jar, &caller, db, result)
}

#[utoipa::path(
    post,
    path = "/api/invitations",
    tag = "Invitations",
    request_body = InviteRequest,
    responses(
        (status = 200, description = "Pending member created or refreshed", body = chorely_chores::Member),
        (status = 400, description = "Invalid email, role, or already a member", body = crate::error::ErrorResponse),
        (status = 403, description = "Admins only", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_invitation(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<InviteRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;
    let Json(request) = payload?;

    let mut db = state.firebase()?.db(caller.credentials());
    let result = InviteService::new(&mut db).invite(&caller.actor, request).await;
    respond(&state, jar, &caller, db, result)
}

#[utoipa::path(
    post,
    path = "/api/invitations/claim",
    tag = "Invitations",
    request_body = ClaimInvitationRequest,
    responses(
        (status = 200, description = "Invitation claimed", body = chorely_chores::Member),
        (status = 404, description = "No pending invitation", body = crate::error::ErrorResponse)
    )
)]
pub async fn claim_invitation(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<ClaimInvitationRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;
    let Json(request) = payload?;

    let mut db = state.firebase()?.db(caller.credentials());
    let result = InviteService::new(&mut db)
        .claim(&caller.actor, &request.family_id)
        .await;
    respond(&state, jar, &caller, db, result)
}

#[utoipa::path(
    delete,
    path = "/api/invitations",
    tag = "Invitations",
    params(RevokeInvitationQuery),
    responses(
        (status = 200, description = "Invitation revoked", body = OkResponse),
        (status = 403, description = "Admins only", body = crate::error::ErrorResponse),
        (status = 404, description = "No pending invitation", body = crate::error::ErrorResponse)
    )
)]
pub async fn revoke_invitation(
    State(state): State<AppState>,
    jar: CookieJar,
    query: Result<Query<RevokeInvitationQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;
    let Query(query) = query?;

    let mut db = state.firebase()?.db(caller.credentials());
    let result = InviteService::new(&mut db)
        .revoke(&caller.actor, &query.family_id, &query.email)
        .await
        .map(|_| OkResponse::new());
    respond(&state, jar, &caller, db, result)
}
