use std::time::Duration;

use async_trait::async_trait;
use chorely_config::FirebaseConfig;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value as Json};
use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{FirestoreError, FirestoreResult};
use crate::query::Query;
use crate::store::DocumentStore;
use crate::value::{fields_to_json, Fields};

const LIST_PAGE_SIZE: u32 = 300;

/// REST client for one Firestore database.
#[derive(Clone)]
pub struct FirestoreClient {
    http: Client,
    documents_url: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Json>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl FirestoreClient {
    pub fn new(config: &FirebaseConfig) -> FirestoreResult<Self> {
        let project_id = config
            .project_id
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or(FirestoreError::NotConfigured)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self::with_http(http, &config.firestore_base_url, project_id))
    }

    pub fn with_http(http: Client, base_url: &str, project_id: &str) -> Self {
        let documents_url = format!(
            "{}/v1/projects/{}/databases/(default)/documents",
            base_url.trim_end_matches('/'),
            project_id
        );
        Self {
            http,
            documents_url,
        }
    }

    fn url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        if encoded.is_empty() {
            self.documents_url.clone()
        } else {
            format!("{}/{}", self.documents_url, encoded.join("/"))
        }
    }

    async fn send(&self, request: RequestBuilder, token: &str) -> FirestoreResult<Response> {
        let response = request.bearer_auth(token).send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) if !envelope.error.status.is_empty() => {
                format!("{}: {}", envelope.error.status, envelope.error.message)
            }
            Ok(envelope) => envelope.error.message,
            Err(_) => body,
        };

        debug!(status, %message, "firestore request rejected");
        Err(FirestoreError::http(status, message))
    }

    async fn document(response: Response) -> FirestoreResult<Document> {
        let json: Json = response.json().await?;
        Document::from_json(json)
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn get(&self, token: &str, path: &str) -> FirestoreResult<Option<Document>> {
        match self.send(self.http.get(self.url(path)), token).await {
            Ok(response) => Self::document(response).await.map(Some),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn create(
        &self,
        token: &str,
        collection: &str,
        id: Option<&str>,
        fields: Fields,
    ) -> FirestoreResult<Document> {
        let mut request = self
            .http
            .post(self.url(collection))
            .json(&json!({ "fields": fields_to_json(&fields) }));
        if let Some(id) = id {
            request = request.query(&[("documentId", id)]);
        }

        let response = self.send(request, token).await?;
        Self::document(response).await
    }

    async fn set(
        &self,
        token: &str,
        path: &str,
        fields: Fields,
        mask: Option<&[&str]>,
    ) -> FirestoreResult<Document> {
        let mut request = self
            .http
            .patch(self.url(path))
            .json(&json!({ "fields": fields_to_json(&fields) }));
        if let Some(mask) = mask {
            let params: Vec<(&str, &str)> = mask
                .iter()
                .map(|field| ("updateMask.fieldPaths", *field))
                .collect();
            request = request.query(&params);
        }

        let response = self.send(request, token).await?;
        Self::document(response).await
    }

    async fn delete(&self, token: &str, path: &str) -> FirestoreResult<()> {
        match self.send(self.http.delete(self.url(path)), token).await {
            Ok(_) => Ok(()),
            Err(error) if error.is_not_found() => Ok(()),
            Err(error) => Err(error),
        }
    }

    async fn list(&self, token: &str, collection: &str) -> FirestoreResult<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(self.url(collection))
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(page) = &page_token {
                request = request.query(&[("pageToken", page)]);
            }

            let page: ListResponse = self.send(request, token).await?.json().await?;
            for raw in page.documents {
                documents.push(Document::from_json(raw)?);
            }

            match page.next_page_token.filter(|next| !next.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(documents)
    }

    async fn query(
        &self,
        token: &str,
        parent: &str,
        query: &Query,
    ) -> FirestoreResult<Vec<Document>> {
        let url = format!("{}:runQuery", self.url(parent));
        let request = self.http.post(url).json(&query.to_json());
        let rows: Vec<Json> = self.send(request, token).await?.json().await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            match row.get("document") {
                Some(document) => documents.push(Document::from_json(document.clone())?),
                None if row.get("error").is_some() => {
                    warn!(error = %row["error"], "firestore query returned an error row");
                }
                None => {}
            }
        }
        Ok(documents)
    }
}
