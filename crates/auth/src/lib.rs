//! # Chorely Auth Crate
//!
//! Everything the backend needs to know about who is calling:
//!
//! - **Session**: the signed, expiring cookie payload ([`SessionCodec`])
//! - **Identity**: Firebase account lookup and refresh-token exchange
//!   ([`FirebaseIdentity`])
//! - **Refresh**: retrying a Firestore call once after the ID token expired
//!   ([`with_token_refresh`])

mod identity;
mod refresh;
mod session;

pub use identity::{
    AccountLookup, FirebaseAccount, FirebaseIdentity, IdentityError, RefreshedTokens,
};
pub use refresh::{
    refresh_credentials, with_token_refresh, AuthFailure, FirebaseCredentials, TokenExchange,
    TokenRefreshError,
};
pub use session::{FirebaseTokens, Session, SessionCodec, SessionError, UserRole};
