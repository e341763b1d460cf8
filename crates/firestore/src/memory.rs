//! In-memory [`DocumentStore`] for tests.
//!
//! Mirrors the REST semantics the app relies on (404 as `None`, 409 on
//! duplicate ids, masked patches, collection-group queries) and records
//! every write so tests can assert on them.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use tokio::sync::RwLock;

use crate::document::Document;
use crate::error::{FirestoreError, FirestoreResult};
use crate::query::Query;
use crate::store::DocumentStore;
use crate::value::Fields;

const NAME_PREFIX: &str = "projects/memory/databases/(default)/documents/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Create(String),
    Set(String),
    Delete(String),
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<BTreeMap<String, Fields>>>,
    writes: Arc<RwLock<Vec<WriteOp>>>,
    rejected_tokens: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document without recording a write.
    pub async fn insert(&self, path: &str, fields: Fields) {
        self.documents.write().await.insert(path.to_string(), fields);
    }

    pub async fn document(&self, path: &str) -> Option<Document> {
        self.documents
            .read()
            .await
            .get(path)
            .map(|fields| to_document(path, fields.clone()))
    }

    pub async fn paths_under(&self, collection: &str) -> Vec<String> {
        let prefix = format!("{collection}/");
        self.documents
            .read()
            .await
            .keys()
            .filter(|path| {
                path.strip_prefix(&prefix)
                    .map(|rest| !rest.contains('/'))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    pub async fn writes(&self) -> Vec<WriteOp> {
        self.writes.read().await.clone()
    }

    pub async fn clear_writes(&self) {
        self.writes.write().await.clear();
    }

    /// Tokens seen by every call, in order.
    pub async fn tokens_seen(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    /// Makes every call carrying `token` fail with status 401.
    pub async fn reject_token(&self, token: &str) {
        self.rejected_tokens.write().await.insert(token.to_string());
    }

    async fn authorize(&self, token: &str) -> FirestoreResult<()> {
        self.calls.write().await.push(token.to_string());
        if self.rejected_tokens.read().await.contains(token) {
            return Err(FirestoreError::http(401, "UNAUTHENTICATED: token expired"));
        }
        Ok(())
    }

    async fn record(&self, op: WriteOp) {
        self.writes.write().await.push(op);
    }
}

fn to_document(path: &str, fields: Fields) -> Document {
    Document::new(format!("{NAME_PREFIX}{path}"), fields)
}

fn random_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(20)
        .map(char::from)
        .collect()
}

fn parent_and_collection(path: &str) -> (&str, &str) {
    let mut segments = path.rsplitn(3, '/');
    let _id = segments.next();
    let collection = segments.next().unwrap_or("");
    let parent = segments.next().unwrap_or("");
    (parent, collection)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, token: &str, path: &str) -> FirestoreResult<Option<Document>> {
        self.authorize(token).await?;
        Ok(self.document(path).await)
    }

    async fn create(
        &self,
        token: &str,
        collection: &str,
        id: Option<&str>,
        fields: Fields,
    ) -> FirestoreResult<Document> {
        self.authorize(token).await?;
        let id = id.map(str::to_string).unwrap_or_else(random_id);
        let path = format!("{collection}/{id}");

        let mut documents = self.documents.write().await;
        if documents.contains_key(&path) {
            return Err(FirestoreError::http(409, format!("ALREADY_EXISTS: {path}")));
        }
        documents.insert(path.clone(), fields.clone());
        drop(documents);

        self.record(WriteOp::Create(path.clone())).await;
        Ok(to_document(&path, fields))
    }

    async fn set(
        &self,
        token: &str,
        path: &str,
        fields: Fields,
        mask: Option<&[&str]>,
    ) -> FirestoreResult<Document> {
        self.authorize(token).await?;

        let mut documents = self.documents.write().await;
        let stored = match mask {
            Some(mask) => {
                let entry = documents.entry(path.to_string()).or_default();
                for field in mask {
                    match fields.get(*field) {
                        Some(value) => {
                            entry.insert(field.to_string(), value.clone());
                        }
                        None => {
                            entry.remove(*field);
                        }
                    }
                }
                entry.clone()
            }
            None => {
                documents.insert(path.to_string(), fields.clone());
                fields
            }
        };
        drop(documents);

        self.record(WriteOp::Set(path.to_string())).await;
        Ok(to_document(path, stored))
    }

    async fn delete(&self, token: &str, path: &str) -> FirestoreResult<()> {
        self.authorize(token).await?;
        self.documents.write().await.remove(path);
        self.record(WriteOp::Delete(path.to_string())).await;
        Ok(())
    }

    async fn list(&self, token: &str, collection: &str) -> FirestoreResult<Vec<Document>> {
        self.authorize(token).await?;
        let paths = self.paths_under(collection).await;
        let documents = self.documents.read().await;
        Ok(paths
            .into_iter()
            .filter_map(|path| documents.get(&path).map(|fields| to_document(&path, fields.clone())))
            .collect())
    }

    async fn query(
        &self,
        token: &str,
        parent: &str,
        query: &Query,
    ) -> FirestoreResult<Vec<Document>> {
        self.authorize(token).await?;

        let documents = self.documents.read().await;
        let mut matches: Vec<Document> = documents
            .iter()
            .filter(|(path, _)| {
                let (doc_parent, collection) = parent_and_collection(path);
                if collection != query.collection {
                    return false;
                }
                if query.all_descendants {
                    parent.is_empty()
                        || doc_parent == parent
                        || doc_parent.starts_with(&format!("{parent}/"))
                } else {
                    doc_parent == parent
                }
            })
            .filter(|(_, fields)| query.matches(fields))
            .map(|(path, fields)| to_document(path, fields.clone()))
            .collect();

        if let Some(limit) = query.limit {
            matches.truncate(limit as usize);
        }
        Ok(matches)
    }
}
