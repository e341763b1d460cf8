//! Error types for the chore domain.

use chorely_auth::{AuthFailure, TokenRefreshError};
use chorely_firestore::FirestoreError;
use thiserror::Error;

use crate::entities::ChoreStatus;

/// Result type alias for chore domain operations
pub type ChoreResult<T> = Result<T, ChoreError>;

/// Main error type for the chore domain. Every variant maps to one stable
/// error code returned to clients.
#[derive(Debug, Error)]
pub enum ChoreError {
    #[error("authentication required")]
    Unauthorized,

    #[error("sign-in has expired: {reason}")]
    ReauthRequired { reason: String },

    #[error("access denied: {reason}")]
    Forbidden { reason: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("at least one chore description is required")]
    DescriptionRequired,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("coin value must be between 0 and {max}")]
    InvalidCoinValue { max: i64 },

    #[error("due date must be formatted as YYYY-MM-DD")]
    InvalidDueDate,

    #[error("unknown role: {role}")]
    InvalidRole { role: String },

    #[error("balance of {balance} coins cannot cover price {price}")]
    InsufficientCoins { balance: i64, price: i64 },

    #[error("item already owned")]
    AlreadyOwned,

    #[error("address already belongs to an active member")]
    AlreadyMember,

    #[error("a family needs at least one admin")]
    LastAdmin,

    #[error("admins cannot remove themselves")]
    CannotRemoveSelf,

    #[error("cannot move chore from {from} to {to}")]
    InvalidTransition { from: ChoreStatus, to: ChoreStatus },

    #[error("firebase is not configured")]
    NotConfigured,

    #[error("firestore error: {0}")]
    Store(FirestoreError),

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ChoreError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable error code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::ReauthRequired { .. } => "reauth_required",
            Self::Forbidden { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::DescriptionRequired => "description_required",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidCoinValue { .. } => "invalid_coin_value",
            Self::InvalidDueDate => "invalid_due_date",
            Self::InvalidRole { .. } => "invalid_role",
            Self::InsufficientCoins { .. } => "insufficient_coins",
            Self::AlreadyOwned => "already_owned",
            Self::AlreadyMember => "already_member",
            Self::LastAdmin => "last_admin",
            Self::CannotRemoveSelf => "cannot_remove_self",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::NotConfigured => "not_configured",
            Self::Store(error) => match error.status() {
                Some(401) => "reauth_required",
                Some(403) => "forbidden",
                Some(404) => "not_found",
                _ if matches!(error, FirestoreError::NotConfigured) => "not_configured",
                _ => "internal_error",
            },
            Self::Internal { .. } => "internal_error",
        }
    }
}

impl AuthFailure for ChoreError {
    fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Store(error) if error.is_unauthorized())
    }
}

impl From<FirestoreError> for ChoreError {
    fn from(error: FirestoreError) -> Self {
        match error {
            FirestoreError::NotConfigured => Self::NotConfigured,
            other => Self::Store(other),
        }
    }
}

impl From<TokenRefreshError> for ChoreError {
    fn from(error: TokenRefreshError) -> Self {
        match error {
            TokenRefreshError::Rejected(reason) => Self::ReauthRequired { reason },
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}
