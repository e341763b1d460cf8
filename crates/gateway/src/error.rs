//! Error vocabulary of the HTTP API.
//!
//! Every failure leaves the gateway as `{"error": "<code>"}` with a status
//! derived from the code.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chorely_auth::{IdentityError, SessionError};
use chorely_chores::ChoreError;
use serde::Serialize;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code, e.g. `forbidden` or `insufficient_coins`.
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
}

impl ApiError {
    /// Builds an error from one of the codes of the API vocabulary.
    pub fn new(code: &'static str) -> Self {
        Self {
            status: status_for(code),
            code,
        }
    }

    pub fn unauthorized() -> Self {
        Self::new("unauthorized")
    }

    pub fn bad_request() -> Self {
        Self::new("invalid_request")
    }

    pub fn not_configured() -> Self {
        Self::new("not_configured")
    }

    pub fn internal_server_error() -> Self {
        Self::new("internal_error")
    }
}

/// HTTP status for an error code.
pub fn status_for(code: &str) -> StatusCode {
    match code {
        "unauthorized" | "reauth_required" => StatusCode::UNAUTHORIZED,
        "forbidden" => StatusCode::FORBIDDEN,
        "not_found" => StatusCode::NOT_FOUND,
        "invalid_request"
        | "description_required"
        | "invalid_email"
        | "invalid_coin_value"
        | "invalid_due_date"
        | "invalid_role"
        | "insufficient_coins"
        | "already_owned"
        | "already_member"
        | "last_admin"
        | "cannot_remove_self" => StatusCode::BAD_REQUEST,
        "invalid_transition" => StatusCode::CONFLICT,
        "not_configured" => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.code.to_string(),
        });
        (self.status, body).into_response()
    }
}

impl From<ChoreError> for ApiError {
    fn from(error: ChoreError) -> Self {
        let api = Self::new(error.code());
        if api.status.is_server_error() {
            error!(error = ?error, code = api.code, "chore service error");
        } else if matches!(error, ChoreError::ReauthRequired { .. }) {
            warn!(error = %error, "firebase session can no longer be refreshed");
        } else {
            debug!(error = %error, code = api.code, "request rejected");
        }
        api
    }
}

impl From<IdentityError> for ApiError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::NotConfigured => Self::not_configured(),
            IdentityError::Rejected { status, message } => {
                warn!(status, message = %message, "firebase rejected the id token");
                Self::unauthorized()
            }
            other => {
                error!(error = ?other, "identity error");
                Self::internal_server_error()
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        error!(error = ?error, "session error");
        Self::internal_server_error()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection, "invalid json body");
        Self::bad_request()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        debug!(error = %rejection, "invalid query string");
        Self::bad_request()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chore_errors_keep_their_code() {
        let error = ApiError::from(ChoreError::InsufficientCoins {
            balance: 3,
            price: 10,
        });
        assert_eq!(error.code, "insufficient_coins");
        assert_eq!(error.status, StatusCode::BAD_REQUEST);

        let error = ApiError::from(ChoreError::ReauthRequired {
            reason: "TOKEN_EXPIRED".into(),
        });
        assert_eq!(error.status, StatusCode::UNAUTHORIZED);
        assert_eq!(error.code, "reauth_required");
    }

    #[test]
    fn status_table() {
        assert_eq!(status_for("invalid_transition"), StatusCode::CONFLICT);
        assert_eq!(status_for("not_configured"), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_for("forbidden"), StatusCode::FORBIDDEN);
        assert_eq!(status_for("something_else"), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn rejected_identity_is_unauthorized() {
        let error = ApiError::from(IdentityError::Rejected {
            status: 400,
            message: "INVALID_ID_TOKEN".into(),
        });
        assert_eq!(error.code, "unauthorized");
        assert_eq!(ApiError::from(IdentityError::NotConfigured).code, "not_configured");
    }
}
