//! # Chorely Firestore Crate
//!
//! A thin typed wrapper around the Firestore REST API. Callers pass the end
//! user's Firebase ID token on every call so security rules apply as if the
//! request came from the browser.
//!
//! - **Value**: typed field values and their wire JSON
//! - **Document**: decoded documents with forgiving read helpers
//! - **Query**: equality-filter structured queries
//! - **DocumentStore**: the seam services depend on; [`FirestoreClient`] is the
//!   REST implementation

mod client;
mod document;
mod error;
mod query;
mod store;
mod value;

#[cfg(any(test, feature = "test-support"))]
pub mod memory;

pub use client::FirestoreClient;
pub use document::Document;
pub use error::{FirestoreError, FirestoreResult};
pub use query::Query;
pub use store::DocumentStore;
pub use value::{fields_from_json, fields_to_json, Fields, Value};
