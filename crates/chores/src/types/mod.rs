//! Shared types and interfaces.

pub mod errors;
pub mod requests;
pub mod responses;

pub use errors::{ChoreError, ChoreResult};
pub use requests::*;
pub use responses::*;

/// The signed-in user a service call acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub uid: String,
    pub email: Option<String>,
    /// Whether Firebase has verified `email`. Invitations are only matched
    /// against verified addresses.
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl Actor {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            email_verified: false,
            name: None,
            picture: None,
        }
    }

    /// Sets a verified email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self.email_verified = true;
        self
    }

    pub fn with_unverified_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self.email_verified = false;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
