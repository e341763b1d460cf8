//! Cosmetics shop REST endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chorely_chores::types::PurchaseRequest;
use chorely_chores::{CosmeticItem, ShopService};

use crate::error::ApiError;
use crate::rest::respond;
use crate::session::require_session;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/cosmetics",
    tag = "Cosmetics",
    responses(
        (status = 200, description = "Cosmetics catalog", body = Vec<CosmeticItem>),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse)
    )
)]
pub async fn catalog(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<&'static [CosmeticItem]>, ApiError> {
    require_session(&state, &jar)?;
    Ok(Json(ShopService::catalog()))
}

#[utoipa::path(
    post,
    path = "/api/cosmetics/purchase",
    tag = "Cosmetics",
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "Item bought", body = chorely_chores::types::PurchaseOutcome),
        (status = 400, description = "Insufficient coins or already owned", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown item", body = crate::error::ErrorResponse)
    )
)]
pub async fn purchase(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<PurchaseRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let caller = require_session(&state, &jar)?;
    let Json(request) = payload?;

    let mut db = state.firebase()?.db(caller.credentials());
    let result = ShopService::new(&mut db).purchase(&caller.actor, request).await;
    respond(&state, jar, &caller, db, result)
}
