//! Family and member REST endpoints

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chorely_chores::types::{CreateFamilyRequest, UpdateMemberRequest};
use chorely_chores::{Family, FamilyService, Member, MemberService};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::rest::{respond, FamilyIdQuery, OkResponse};
use crate::session::require_session;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedFamily {
    pub family: Family,
    pub member: Member,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FamilySummaryQuery {
    /// Defaults to the caller's first family.
    #[serde(default)]
    pub family_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/family",
    tag = "Family",
    request_body = CreateFamilyRequest,
    responses(
        (status = 200, description = "Family created with the caller as admin", body = CreatedFamily),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_family(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<CreateFamilyRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;
    let Json(request) = payload?;

    let mut db = state.firebase()?.db(caller.credentials());
    let result = FamilyService::new(&mut db)
        .create(&caller.actor, request)
        .await
        .map(|(family, member)| CreatedFamily { family, member });
    respond(&state, jar, &caller, db, result)
}

#[utoipa::path(
    get,
    path = "/api/family",
    tag = "Family",
    params(FamilySummaryQuery),
    responses(
        (status = 200, description = "Family overview", body = chorely_chores::types::FamilySummary),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a member", body = crate::error::ErrorResponse),
        (status = 404, description = "No family", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_family(
    State(state): State<AppState>,
    jar: CookieJar,
    query: Result<Query<FamilySummaryQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;
    let Query(query) = query?;

    let mut db = state.firebase()?.db(caller.credentials());
    let result = FamilyService::new(&mut db)
        .summary(&caller.actor, query.family_id.as_deref())
        .await;
    respond(&state, jar, &caller, db, result)
}

#[utoipa::path(
    get,
    path = "/api/family/members",
    tag = "Family",
    params(FamilyIdQuery),
    responses(
        (status = 200, description = "Active and invited members", body = Vec<Member>),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a member", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    jar: CookieJar,
    query: Result<Query<FamilyIdQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;
    let Query(query) = query?;

    let mut db = state.firebase()?.db(caller.credentials());
    let mut members = MemberService::new(&mut db);
    let result = match members.require_member(&query.family_id, &caller.actor.uid).await {
        Ok(_) => members.list(&query.family_id).await,
        Err(error) => Err(error),
    };
    respond(&state, jar, &caller, db, result)
}

#[utoipa::path(
    patch,
    path = "/api/family/members/{member_id}",
    tag = "Family",
    params(("member_id" = String, Path, description = "Member document id")),
    request_body = UpdateMemberRequest,
    responses(
        (status = 200, description = "Member updated", body = Member),
        (status = 400, description = "Invalid role or last admin", body = crate::error::ErrorResponse),
        (status = 403, description = "Admins only", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_member(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(member_id): Path<String>,
    payload: Result<Json<UpdateMemberRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;
    let Json(request) = payload?;

    let mut db = state.firebase()?.db(caller.credentials());
    let result = MemberService::new(&mut db)
        .update(&caller.actor, &member_id, request)
        .await;
    respond(&state, jar, &caller, db, result)
}

#[utoipa::path(
    delete,
    path = "/api/family/members/{member_id}",
    tag = "Family",
    params(
        ("member_id" = String, Path, description = "Member document id"),
        FamilyIdQuery
    ),
    responses(
        (status = 200, description = "Member removed", body = OkResponse),
        (status = 400, description = "Last admin or self", body = crate::error::ErrorResponse),
        (status = 403, description = "Admins only", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_member(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(member_id): Path<String>,
    query: Result<Query<FamilyIdQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;
    let Query(query) = query?;

    let mut db = state.firebase()?.db(caller.credentials());
    let result = MemberService::new(&mut db)
        .remove(&caller.actor, &query.family_id, &member_id)
        .await
        .map(|_| OkResponse::new());
    respond(&state, jar, &caller, db, result)
}
