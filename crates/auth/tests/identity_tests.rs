use chorely_auth::{AccountLookup, FirebaseIdentity, IdentityError, TokenExchange};
use httpmock::prelude::*;
use serde_json::json;

fn identity(server: &MockServer) -> FirebaseIdentity {
    FirebaseIdentity::with_http(
        reqwest::Client::new(),
        "api-key",
        &server.base_url(),
        &server.base_url(),
    )
}

#[tokio::test]
async fn refresh_posts_form_and_decodes_tokens() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/token")
                .query_param("key", "api-key")
                .x_www_form_urlencoded_tuple("grant_type", "refresh_token")
                .x_www_form_urlencoded_tuple("refresh_token", "refresh-1");
            then.status(200).json_body(json!({
                "access_token": "fresh",
                "expires_in": "3600",
                "token_type": "Bearer",
                "refresh_token": "refresh-2",
                "id_token": "fresh",
                "user_id": "uid-1",
                "project_id": "demo"
            }));
        })
        .await;

    let tokens = identity(&server).refresh("refresh-1").await.unwrap();

    mock.assert_async().await;
    assert_eq!(tokens.uid, "uid-1");
    assert_eq!(tokens.id_token, "fresh");
    assert_eq!(tokens.refresh_token, "refresh-2");
    assert_eq!(tokens.expires_in_seconds, 3600);
}

#[tokio::test]
async fn refresh_rejection_carries_provider_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/token");
            then.status(400).json_body(json!({
                "error": { "code": 400, "message": "TOKEN_EXPIRED", "status": "INVALID_ARGUMENT" }
            }));
        })
        .await;

    let error = identity(&server).refresh("revoked").await.unwrap_err();
    match error {
        IdentityError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "TOKEN_EXPIRED");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn lookup_resolves_account_profile() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/accounts:lookup")
                .query_param("key", "api-key")
                .json_body(json!({ "idToken": "id-1" }));
            then.status(200).json_body(json!({
                "kind": "identitytoolkit#GetAccountInfoResponse",
                "users": [{
                    "localId": "uid-1",
                    "email": "pat@example.com",
                    "emailVerified": true,
                    "displayName": "Pat",
                    "photoUrl": ""
                }]
            }));
        })
        .await;

    let account = identity(&server).lookup("id-1").await.unwrap();

    mock.assert_async().await;
    assert_eq!(account.uid, "uid-1");
    assert_eq!(account.email.as_deref(), Some("pat@example.com"));
    assert!(account.email_verified);
    assert_eq!(account.name.as_deref(), Some("Pat"));
    assert_eq!(account.picture, None);
}

#[tokio::test]
async fn lookup_without_users_is_a_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/accounts:lookup");
            then.status(200).json_body(json!({ "kind": "identitytoolkit#GetAccountInfoResponse" }));
        })
        .await;

    let error = identity(&server).lookup("id-1").await.unwrap_err();
    assert!(matches!(error, IdentityError::Decode(_)));
}

#[test]
fn identity_requires_api_key() {
    let config = chorely_config::FirebaseConfig::default();
    assert!(matches!(
        FirebaseIdentity::new(&config),
        Err(IdentityError::NotConfigured)
    ));
}
