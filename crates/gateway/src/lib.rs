//! # Chorely Gateway Crate
//!
//! The HTTP surface of the Chorely backend. Handlers authenticate through the
//! signed session cookie, call the domain services of `chorely-chores` with
//! the caller's Firebase credentials and answer with JSON.
//!
//! ## Architecture
//!
//! - **REST**: axum handlers with OpenAPI annotations
//! - **Session**: cookie decoding and re-issuing after a token refresh
//! - **State**: session codec, cookie settings and the Firebase backend
//! - **Middleware**: CORS and request logging

pub mod docs;
pub mod error;
pub mod middleware;
pub mod rest;
pub mod session;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use session::Caller;
pub use state::{AppState, CookieSettings, FirebaseBackend};

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};

/// Create the main application router with all routes
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(rest::health::health_check))
        // Auth
        .route("/api/auth/callback", post(rest::auth::callback))
        .route("/api/auth/logout", post(rest::auth::logout))
        .route("/api/auth/session", get(rest::auth::session))
        // Family
        .route(
            "/api/family",
            get(rest::family::get_family).post(rest::family::create_family),
        )
        .route("/api/family/members", get(rest::family::list_members))
        .route(
            "/api/family/members/:member_id",
            patch(rest::family::update_member).delete(rest::family::remove_member),
        )
        // Invitations
        .route(
            "/api/invitations",
            get(rest::invitations::list_invitations)
                .post(rest::invitations::create_invitation)
                .delete(rest::invitations::revoke_invitation),
        )
        .route(
            "/api/invitations/claim",
            post(rest::invitations::claim_invitation),
        )
        // Chores
        .route(
            "/api/chores",
            get(rest::chores::list_chores).post(rest::chores::create_chores),
        )
        .route("/api/chores/suggestions", get(rest::chores::suggestions))
        .route(
            "/api/chores/:chore_id",
            patch(rest::chores::update_chore).delete(rest::chores::delete_chore),
        )
        .route("/api/chores/:chore_id/submit", post(rest::chores::submit_chore))
        .route("/api/chores/:chore_id/review", post(rest::chores::review_chore))
        // Cosmetics
        .route("/api/cosmetics", get(rest::cosmetics::catalog))
        .route("/api/cosmetics/purchase", post(rest::cosmetics::purchase));

    #[cfg(debug_assertions)]
    let router = router.route("/api-docs/openapi.json", get(docs::openapi_json));

    router
        .with_state(state)
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
