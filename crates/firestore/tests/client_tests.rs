//! REST client tests against a mocked Firestore endpoint.

use httpmock::prelude::*;
use serde_json::json;

use chorely_firestore::{fields, DocumentStore, FirestoreClient, FirestoreError, Query, Value};

const DOCS: &str = "/v1/projects/demo/databases/(default)/documents";

fn client(server: &MockServer) -> FirestoreClient {
    FirestoreClient::with_http(reqwest::Client::new(), &server.base_url(), "demo")
}

fn doc_name(path: &str) -> String {
    format!("projects/demo/databases/(default)/documents/{path}")
}

#[tokio::test]
async fn get_decodes_document_and_sends_bearer_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("{DOCS}/families/f1"))
                .header("authorization", "Bearer id-token");
            then.status(200).json_body(json!({
                "name": doc_name("families/f1"),
                "fields": {
                    "name": { "stringValue": "The Parkers" },
                    "createdBy": { "stringValue": "u1" }
                }
            }));
        })
        .await;

    let document = client(&server)
        .get("id-token", "families/f1")
        .await
        .expect("request should succeed")
        .expect("document should exist");

    mock.assert_async().await;
    assert_eq!(document.id, "f1");
    assert_eq!(document.string("name"), "The Parkers");
}

#[tokio::test]
async fn get_maps_404_to_none() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{DOCS}/users/ghost"));
            then.status(404).json_body(json!({
                "error": { "code": 404, "message": "Document not found", "status": "NOT_FOUND" }
            }));
        })
        .await;

    let result = client(&server).get("t", "users/ghost").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn errors_are_tagged_with_http_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{DOCS}/users/u1"));
            then.status(401).json_body(json!({
                "error": {
                    "code": 401,
                    "message": "Request had invalid authentication credentials.",
                    "status": "UNAUTHENTICATED"
                }
            }));
        })
        .await;

    let error = client(&server).get("stale", "users/u1").await.unwrap_err();
    assert!(error.is_unauthorized());
    match error {
        FirestoreError::Http { status, message } => {
            assert_eq!(status, 401);
            assert!(message.starts_with("UNAUTHENTICATED"), "got {message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn create_posts_fields_with_document_id() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{DOCS}/families/f1/chores"))
                .query_param("documentId", "c1")
                .json_body(json!({
                    "fields": {
                        "title": { "stringValue": "Vacuum" },
                        "coinValue": { "integerValue": "4" },
                        "deleted": { "booleanValue": false }
                    }
                }));
            then.status(200).json_body(json!({
                "name": doc_name("families/f1/chores/c1"),
                "fields": {
                    "title": { "stringValue": "Vacuum" },
                    "coinValue": { "integerValue": "4" },
                    "deleted": { "booleanValue": false }
                }
            }));
        })
        .await;

    let document = client(&server)
        .create(
            "t",
            "families/f1/chores",
            Some("c1"),
            fields! { "title" => "Vacuum", "coinValue" => 4i64, "deleted" => false },
        )
        .await
        .expect("create should succeed");

    mock.assert_async().await;
    assert_eq!(document.path(), "families/f1/chores/c1");
    assert_eq!(document.integer("coinValue"), 4);
}

#[tokio::test]
async fn set_with_mask_sends_update_mask_params() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("PATCH")
                .path(format!("{DOCS}/families/f1/members/u2"))
                .query_param("updateMask.fieldPaths", "coins");
            then.status(200).json_body(json!({
                "name": doc_name("families/f1/members/u2"),
                "fields": { "coins": { "integerValue": "12" }, "name": { "stringValue": "Sam" } }
            }));
        })
        .await;

    let document = client(&server)
        .set(
            "t",
            "families/f1/members/u2",
            fields! { "coins" => 12i64 },
            Some(&["coins"][..]),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(document.integer("coins"), 12);
    assert_eq!(document.string("name"), "Sam");
}

#[tokio::test]
async fn delete_treats_missing_document_as_success() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("{DOCS}/invitations/gone"));
            then.status(404);
        })
        .await;

    client(&server)
        .delete("t", "invitations/gone")
        .await
        .expect("missing document delete should succeed");
    mock.assert_async().await;
}

#[tokio::test]
async fn list_decodes_every_document_on_the_page() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("{DOCS}/families/f1/members"))
                .query_param("pageSize", "300");
            then.status(200).json_body(json!({
                "documents": [
                    { "name": doc_name("families/f1/members/a") },
                    { "name": doc_name("families/f1/members/b") }
                ]
            }));
        })
        .await;

    let documents = client(&server).list("t", "families/f1/members").await.unwrap();

    mock.assert_async().await;
    let ids: Vec<_> = documents.iter().map(|doc| doc.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn query_posts_structured_query_and_skips_empty_rows() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{DOCS}/families/f1:runQuery"))
                .json_body_partial(
                    json!({
                        "structuredQuery": {
                            "from": [{ "collectionId": "members", "allDescendants": false }]
                        }
                    })
                    .to_string(),
                );
            then.status(200).json_body(json!([
                { "readTime": "2024-01-01T00:00:00Z" },
                {
                    "document": {
                        "name": doc_name("families/f1/members/abc"),
                        "fields": { "email": { "stringValue": "kid@example.com" } }
                    },
                    "readTime": "2024-01-01T00:00:00Z"
                }
            ]));
        })
        .await;

    let documents = client(&server)
        .query(
            "t",
            "families/f1",
            &Query::collection("members").where_eq("email", "kid@example.com"),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].get("email"), Some(&Value::from("kid@example.com")));
}

#[test]
fn client_requires_project_id() {
    let config = chorely_config::FirebaseConfig::default();
    let error = match FirestoreClient::new(&config) {
        Ok(_) => panic!("missing project should fail"),
        Err(error) => error,
    };
    assert!(matches!(error, FirestoreError::NotConfigured));
}
