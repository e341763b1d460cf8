//! Request-scoped document access with transparent ID token refresh.

use chorely_auth::{with_token_refresh, FirebaseCredentials, TokenExchange};
use chorely_firestore::{Document, DocumentStore, Fields, Query};

use crate::types::{ChoreError, ChoreResult};

/// Document store handle bound to one caller's Firebase credentials.
///
/// Every call runs through [`with_token_refresh`]: an expired ID token is
/// exchanged once and the call retried. Callers inspect
/// [`Db::credentials`] afterwards to persist refreshed tokens.
pub struct Db<'a> {
    store: &'a dyn DocumentStore,
    exchange: &'a dyn TokenExchange,
    credentials: FirebaseCredentials,
}

impl<'a> Db<'a> {
    pub fn new(
        store: &'a dyn DocumentStore,
        exchange: &'a dyn TokenExchange,
        credentials: FirebaseCredentials,
    ) -> Self {
        Self {
            store,
            exchange,
            credentials,
        }
    }

    pub fn uid(&self) -> &str {
        &self.credentials.uid
    }

    pub fn credentials(&self) -> &FirebaseCredentials {
        &self.credentials
    }

    pub fn into_credentials(self) -> FirebaseCredentials {
        self.credentials
    }

    pub async fn get(&mut self, path: &str) -> ChoreResult<Option<Document>> {
        let store = self.store;
        with_token_refresh(self.exchange, &mut self.credentials, |token| async move {
            store.get(&token, path).await.map_err(ChoreError::from)
        })
        .await
    }

    pub async fn create(
        &mut self,
        collection: &str,
        id: Option<&str>,
        fields: Fields,
    ) -> ChoreResult<Document> {
        let store = self.store;
        with_token_refresh(self.exchange, &mut self.credentials, |token| {
            let fields = fields.clone();
            async move {
                store
                    .create(&token, collection, id, fields)
                    .await
                    .map_err(ChoreError::from)
            }
        })
        .await
    }

    pub async fn set(
        &mut self,
        path: &str,
        fields: Fields,
        mask: Option<&[&str]>,
    ) -> ChoreResult<Document> {
        let store = self.store;
        with_token_refresh(self.exchange, &mut self.credentials, |token| {
            let fields = fields.clone();
            async move {
                store
                    .set(&token, path, fields, mask)
                    .await
                    .map_err(ChoreError::from)
            }
        })
        .await
    }

    pub async fn delete(&mut self, path: &str) -> ChoreResult<()> {
        let store = self.store;
        with_token_refresh(self.exchange, &mut self.credentials, |token| async move {
            store.delete(&token, path).await.map_err(ChoreError::from)
        })
        .await
    }

    pub async fn list(&mut self, collection: &str) -> ChoreResult<Vec<Document>> {
        let store = self.store;
        with_token_refresh(self.exchange, &mut self.credentials, |token| async move {
            store.list(&token, collection).await.map_err(ChoreError::from)
        })
        .await
    }

    pub async fn query(&mut self, parent: &str, query: &Query) -> ChoreResult<Vec<Document>> {
        let store = self.store;
        with_token_refresh(self.exchange, &mut self.credentials, |token| async move {
            store
                .query(&token, parent, query)
                .await
                .map_err(ChoreError::from)
        })
        .await
    }
}
