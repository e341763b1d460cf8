use thiserror::Error;

pub type FirestoreResult<T> = Result<T, FirestoreError>;

#[derive(Debug, Error)]
pub enum FirestoreError {
    /// The REST API answered with a non-success status.
    #[error("firestore request failed with status {status}: {message}")]
    Http { status: u16, message: String },
    #[error("firestore transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid firestore response: {0}")]
    Decode(String),
    #[error("firestore is not configured")]
    NotConfigured,
}

impl FirestoreError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(error) => error.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// True when the ID token was missing, expired or revoked.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}
