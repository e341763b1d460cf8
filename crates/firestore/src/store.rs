use async_trait::async_trait;

use crate::document::Document;
use crate::error::FirestoreResult;
use crate::query::Query;
use crate::value::Fields;

/// Document operations, authenticated per call with the end user's ID token.
///
/// Paths are relative to the database root (`families/f1/chores/c1`).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches a document; a missing document is `Ok(None)`.
    async fn get(&self, token: &str, path: &str) -> FirestoreResult<Option<Document>>;

    /// Creates a document under `collection`. Without an id the store picks
    /// one. Fails with status 409 when the id is taken.
    async fn create(
        &self,
        token: &str,
        collection: &str,
        id: Option<&str>,
        fields: Fields,
    ) -> FirestoreResult<Document>;

    /// Writes `fields` at `path`, creating the document when absent. With a
    /// mask only the named fields change; without one the document is
    /// replaced.
    async fn set(
        &self,
        token: &str,
        path: &str,
        fields: Fields,
        mask: Option<&[&str]>,
    ) -> FirestoreResult<Document>;

    /// Deletes a document. Deleting a missing document succeeds.
    async fn delete(&self, token: &str, path: &str) -> FirestoreResult<()>;

    /// Lists every document of one collection.
    async fn list(&self, token: &str, collection: &str) -> FirestoreResult<Vec<Document>>;

    /// Runs `query` below `parent` (`""` for the database root).
    async fn query(&self, token: &str, parent: &str, query: &Query)
        -> FirestoreResult<Vec<Document>>;
}
