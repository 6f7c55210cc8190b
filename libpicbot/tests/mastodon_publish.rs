//! Publishing through the Mastodon client against a mock Mastodon server

use std::time::Duration;

use httpmock::prelude::*;
use libpicbot::config::{AppConfig, LoginConfig};
use libpicbot::error::{PicbotError, PlatformError};
use libpicbot::platforms::mastodon::MastodonPublisher;
use libpicbot::poster::publish;
use libpicbot::types::ResolvedResource;
use secrecy::SecretString;
use serde_json::{json, Value};

const CREATED_AT: &str = "2024-01-01T00:00:00.000Z";

fn publisher(server: &MockServer) -> MastodonPublisher {
    let app = AppConfig {
        server: server.base_url(),
        client_id: "client-id".to_string(),
        client_secret: SecretString::from("client-secret".to_string()),
    };
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    MastodonPublisher::with_http_client(app, http).with_media_check_interval(Duration::ZERO)
}

fn login() -> LoginConfig {
    LoginConfig {
        username: "bot".to_string(),
        password: SecretString::from("hunter2".to_string()),
    }
}

fn image() -> ResolvedResource {
    ResolvedResource {
        location: "images/cat.png".to_string(),
        stream: Box::new(std::io::Cursor::new(b"png bytes".to_vec())),
        attribution: "some artist".to_string(),
        sensitive: true,
    }
}

fn account() -> Value {
    json!({
        "id": "1",
        "username": "bot",
        "acct": "bot",
        "display_name": "Picture Bot",
        "locked": false,
        "group": false,
        "created_at": CREATED_AT,
        "followers_count": 0,
        "following_count": 0,
        "statuses_count": 0,
        "note": "",
        "url": "https://a.example/@bot",
        "avatar": "",
        "avatar_static": "",
        "header": "",
        "header_static": "",
        "emojis": [],
        "fields": [],
        "bot": true
    })
}

fn attachment(url: Option<&str>) -> Value {
    json!({
        "id": "m1",
        "type": "image",
        "url": url,
        "preview_url": null,
        "remote_url": null,
        "description": null,
        "blurhash": null
    })
}

fn status() -> Value {
    json!({
        "id": "s1",
        "uri": "https://a.example/users/bot/statuses/s1",
        "url": "https://a.example/@bot/s1",
        "account": account(),
        "content": "<p>Source: some artist</p>",
        "created_at": CREATED_AT,
        "emojis": [],
        "replies_count": 0,
        "reblogs_count": 0,
        "favourites_count": 0,
        "sensitive": true,
        "spoiler_text": "",
        "visibility": "public",
        "media_attachments": [],
        "mentions": [],
        "tags": []
    })
}

/// Token and credential checks that always succeed
async fn mock_login(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/oauth/token")
                .body_includes("grant_type=password")
                .body_includes("username=bot");
            then.status(200).json_body(json!({
                "access_token": "token-123",
                "token_type": "Bearer",
                "scope": "read write follow",
                "created_at": 1700000000
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/accounts/verify_credentials");
            then.status(200).json_body(account());
        })
        .await;
}

#[tokio::test]
async fn test_publish_uploads_and_posts() {
    let server = MockServer::start_async().await;
    mock_login(&server).await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v2/media");
            then.status(200)
                .json_body(attachment(Some("https://a.example/m1.png")));
        })
        .await;
    let media_check = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/media/m1");
            then.status(200)
                .json_body(attachment(Some("https://a.example/m1.png")));
        })
        .await;
    let post = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/statuses")
                .body_includes("\"status\":\"Source: some artist\"")
                .body_includes("\"media_ids\":[\"m1\"]")
                .body_includes("\"sensitive\":\"true\"");
            then.status(200).json_body(status());
        })
        .await;

    let mut publisher = publisher(&server);
    let published = publish(&mut publisher, &login(), image()).await.unwrap();

    assert_eq!(published.platform, "mastodon");
    assert_eq!(published.media_id, "m1");
    assert_eq!(published.post_id, "s1");
    upload.assert_calls_async(1).await;
    media_check.assert_calls_async(0).await;
    post.assert_calls_async(1).await;
}

#[tokio::test]
async fn test_processing_media_is_awaited_before_posting() {
    let server = MockServer::start_async().await;
    mock_login(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v2/media");
            then.status(202).json_body(attachment(None));
        })
        .await;
    let media_check = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/media/m1");
            then.status(200)
                .json_body(attachment(Some("https://a.example/m1.png")));
        })
        .await;
    let post = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/statuses")
                .body_includes("\"media_ids\":[\"m1\"]");
            then.status(200).json_body(status());
        })
        .await;

    let mut publisher = publisher(&server);
    let published = publish(&mut publisher, &login(), image()).await.unwrap();

    assert_eq!(published.media_id, "m1");
    media_check.assert_calls_async(1).await;
    post.assert_calls_async(1).await;
}

#[tokio::test]
async fn test_media_still_processing_fails_before_posting() {
    let server = MockServer::start_async().await;
    mock_login(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v2/media");
            then.status(202).json_body(attachment(None));
        })
        .await;
    let media_check = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/media/m1");
            then.status(206).json_body(attachment(None));
        })
        .await;
    let post = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/statuses");
            then.status(200).json_body(status());
        })
        .await;

    let mut publisher = publisher(&server);
    let error = publish(&mut publisher, &login(), image()).await.unwrap_err();

    match error {
        PicbotError::Platform(PlatformError::Upload(message)) => {
            assert!(message.contains("Media m1 was still processing after 10 checks"))
        }
        other => panic!("Expected upload failure, got {:?}", other),
    }
    media_check.assert_calls_async(10).await;
    post.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_rejected_status_carries_hint() {
    let server = MockServer::start_async().await;
    mock_login(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v2/media");
            then.status(200)
                .json_body(attachment(Some("https://a.example/m1.png")));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/statuses");
            then.status(422)
                .json_body(json!({ "error": "Validation failed: Text can't be blank" }));
        })
        .await;

    let mut publisher = publisher(&server);
    let error = publish(&mut publisher, &login(), image()).await.unwrap_err();

    assert_eq!(error.exit_code(), 1);
    let message = error.to_string();
    assert!(message.starts_with("Platform error: Posting failed: Mastodon post status failed"));
    assert!(message.contains("Validation failed"));
    assert!(message.contains(
        "Suggestion: The server rejected the content; check the image format and size."
    ));
}

#[tokio::test]
async fn test_rejected_login_is_authentication_failure() {
    let server = MockServer::start_async().await;
    let token = server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(401)
                .json_body(json!({ "error": "invalid_grant" }));
        })
        .await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v2/media");
            then.status(200)
                .json_body(attachment(Some("https://a.example/m1.png")));
        })
        .await;

    let mut publisher = publisher(&server);
    let error = publish(&mut publisher, &login(), image()).await.unwrap_err();

    assert_eq!(error.exit_code(), 2);
    let message = error.to_string();
    assert!(message.contains("Mastodon rejected the login (HTTP 401 Unauthorized)"));
    assert!(message.contains("invalid_grant"));
    token.assert_calls_async(1).await;
    upload.assert_calls_async(0).await;
}
