//! Chore REST endpoints

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chorely_chores::types::{
    CreateChoresRequest, ListChoresQuery, ReviewChoreRequest, SubmitChoreRequest,
    UpdateChoreRequest,
};
use chorely_chores::{Chore, ChoreService, SuggestionService};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ApiError;
use crate::rest::{respond, FamilyIdQuery, OkResponse};
use crate::session::require_session;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SuggestionsQuery {
    pub family_id: String,
    /// Defaults to 8, capped at 50.
    #[serde(default)]
    pub limit: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/api/chores",
    tag = "Chores",
    params(ListChoresQuery),
    responses(
        (status = 200, description = "Chores of the family, newest first", body = Vec<Chore>),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a member", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_chores(
    State(state): State<AppState>,
    jar: CookieJar,
    query: Result<Query<ListChoresQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;
    let Query(query) = query?;

    let mut db = state.firebase()?.db(caller.credentials());
    let result = ChoreService::new(&mut db).list(&caller.actor, query).await;
    respond(&state, jar, &caller, db, result)
}

#[utoipa::path(
    post,
    path = "/api/chores",
    tag = "Chores",
    request_body = CreateChoresRequest,
    responses(
        (status = 200, description = "One chore per description", body = Vec<Chore>),
        (status = 400, description = "Invalid descriptions, coin value or due date", body = crate::error::ErrorResponse),
        (status = 403, description = "Admins only", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_chores(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<CreateChoresRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;
    let Json(request) = payload?;

    let mut db = state.firebase()?.db(caller.credentials());
    let result = ChoreService::new(&mut db).create(&caller.actor, request).await;
    respond(&state, jar, &caller, db, result)
}

#[utoipa::path(
    patch,
    path = "/api/chores/{chore_id}",
    tag = "Chores",
    params(("chore_id" = String, Path, description = "Chore id")),
    request_body = UpdateChoreRequest,
    responses(
        (status = 200, description = "Chore updated", body = Chore),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 403, description = "Admins only", body = crate::error::ErrorResponse),
        (status = 404, description = "Chore not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_chore(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(chore_id): Path<String>,
    payload: Result<Json<UpdateChoreRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;
    let Json(request) = payload?;

    let mut db = state.firebase()?.db(caller.credentials());
    let result = ChoreService::new(&mut db)
        .update(&caller.actor, &chore_id, request)
        .await;
    respond(&state, jar, &caller, db, result)
}

#[utoipa::path(
    post,
    path = "/api/chores/{chore_id}/submit",
    tag = "Chores",
    params(("chore_id" = String, Path, description = "Chore id")),
    request_body = SubmitChoreRequest,
    responses(
        (status = 200, description = "Chore submitted for review", body = Chore),
        (status = 403, description = "Only the assignee or an admin", body = crate::error::ErrorResponse),
        (status = 409, description = "Chore is not open or rejected", body = crate::error::ErrorResponse)
    )
)]
pub async fn submit_chore(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(chore_id): Path<String>,
    payload: Result<Json<SubmitChoreRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;
    let Json(request) = payload?;

    let mut db = state.firebase()?.db(caller.credentials());
    let result = ChoreService::new(&mut db)
        .submit(&caller.actor, &request.family_id, &chore_id)
        .await;
    respond(&state, jar, &caller, db, result)
}

#[utoipa::path(
    post,
    path = "/api/chores/{chore_id}/review",
    tag = "Chores",
    params(("chore_id" = String, Path, description = "Chore id")),
    request_body = ReviewChoreRequest,
    responses(
        (status = 200, description = "Chore approved or rejected", body = Chore),
        (status = 403, description = "Admins only", body = crate::error::ErrorResponse),
        (status = 409, description = "Chore is not submitted", body = crate::error::ErrorResponse)
    )
)]
pub async fn review_chore(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(chore_id): Path<String>,
    payload: Result<Json<ReviewChoreRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;
    let Json(request) = payload?;

    let mut db = state.firebase()?.db(caller.credentials());
    let result = ChoreService::new(&mut db)
        .review(&caller.actor, &chore_id, request)
        .await;
    respond(&state, jar, &caller, db, result)
}

#[utoipa::path(
    delete,
    path = "/api/chores/{chore_id}",
    tag = "Chores",
    params(
        ("chore_id" = String, Path, description = "Chore id"),
        FamilyIdQuery
    ),
    responses(
        (status = 200, description = "Chore deleted", body = OkResponse),
        (status = 403, description = "Admins only", body = crate::error::ErrorResponse),
        (status = 404, description = "Chore not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_chore(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(chore_id): Path<String>,
    query: Result<Query<FamilyIdQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;
    let Query(query) = query?;

    let mut db = state.firebase()?.db(caller.credentials());
    let result = ChoreService::new(&mut db)
        .delete(&caller.actor, &query.family_id, &chore_id)
        .await
        .map(|_| OkResponse::new());
    respond(&state, jar, &caller, db, result)
}

#[utoipa::path(
    get,
    path = "/api/chores/suggestions",
    tag = "Chores",
    params(SuggestionsQuery),
    responses(
        (status = 200, description = "Most used chore titles", body = Vec<chorely_chores::ChoreSuggestion>),
        (status = 403, description = "Not a member", body = crate::error::ErrorResponse)
    )
)]
pub async fn suggestions(
    State(state): State<AppState>,
    jar: CookieJar,
    query: Result<Query<SuggestionsQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;
    let Query(query) = query?;

    let mut db = state.firebase()?.db(caller.credentials());
    let result = SuggestionService::new(&mut db)
        .suggest(&caller.actor, &query.family_id, query.limit)
        .await;
    respond(&state, jar, &caller, db, result)
}
