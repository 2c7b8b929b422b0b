#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use solvr_api::{
    ApiClient, AuthFailureEvent, Error, OAuthProvider, RegisterRequest, VoteDirection,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "error": { "code": "UNAUTHORIZED", "message": "authentication required" }
    }))
}

/// Record every auth-failure event the client dispatches.
fn record_auth_failures(client: &ApiClient) -> Arc<Mutex<Vec<AuthFailureEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    client.on_auth_error(move |event| sink.lock().unwrap().push(event.clone()));
    seen
}

// ── Identity ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_me_sends_bearer_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": "u1",
                "username": "ada",
                "display_name": "Ada Lovelace",
                "email": "ada@example.com",
                "role": "user",
                "stats": { "posts_created": 3 },
                "badges": []
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    client.set_auth_token(secret("tok-123"));
    let me = client.fetch_me().await.unwrap();

    assert_eq!(me.id, "u1");
    assert_eq!(me.display_name, "Ada Lovelace");
    assert_eq!(me.kind, None);
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;

    let _ = client.fetch_me().await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

// ── Auth-failure broadcast ──────────────────────────────────────────

#[tokio::test]
async fn test_401_notifies_every_subscriber_and_still_fails_the_caller() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;

    let first = record_auth_failures(&client);
    let second = record_auth_failures(&client);

    let result = client.fetch_me().await;

    match result {
        Err(Error::Unauthorized { ref message }) => {
            assert_eq!(message.as_deref(), Some("authentication required"));
        }
        other => panic!("expected Unauthorized error, got: {other:?}"),
    }

    let first = first.lock().unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].status_code, 401);
    assert_eq!(first[0].path, "/v1/me");
    assert_eq!(second.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_overlapping_401s_each_emit_an_event() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/posts/p1/vote"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/posts/p2/my-vote"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;

    let seen = record_auth_failures(&client);

    let (a, b) = tokio::join!(
        client.submit_vote("p1", VoteDirection::Up),
        client.fetch_my_vote("p2"),
    );
    assert!(a.unwrap_err().is_unauthorized());
    assert!(b.unwrap_err().is_unauthorized());

    let mut paths: Vec<String> = seen.lock().unwrap().iter().map(|e| e.path.clone()).collect();
    paths.sort();
    assert_eq!(paths, vec!["/v1/posts/p1/vote", "/v1/posts/p2/my-vote"]);
}

#[tokio::test]
async fn test_off_auth_error_stops_delivery() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;

    let calls = Arc::new(Mutex::new(0_u32));
    let c = Arc::clone(&calls);
    let sub = client.on_auth_error(move |_| *c.lock().unwrap() += 1);

    let _ = client.fetch_me().await;
    assert!(client.off_auth_error(sub));
    let _ = client.fetch_me().await;

    assert_eq!(*calls.lock().unwrap(), 1);
    assert_eq!(client.auth_error_subscribers(), 0);
}

#[tokio::test]
async fn test_non_401_failures_do_not_broadcast() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/posts/p1/vote"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": { "code": "DUPLICATE_VOTE", "message": "you have already voted on this post" }
        })))
        .mount(&server)
        .await;

    let seen = record_auth_failures(&client);
    let err = client.submit_vote("p1", VoteDirection::Up).await.unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(err.api_error_code(), Some("DUPLICATE_VOTE"));
    assert!(seen.lock().unwrap().is_empty());
}

// ── Votes ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_submit_vote_returns_server_tallies() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/posts/p1/vote"))
        .and(body_json(json!({ "direction": "down" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "vote_score": 22, "upvotes": 30, "downvotes": 8, "user_vote": "down" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.submit_vote("p1", VoteDirection::Down).await.unwrap();

    assert_eq!(result.vote_score, 22);
    assert_eq!(result.upvotes, 30);
    assert_eq!(result.user_vote, Some(VoteDirection::Down));
}

#[tokio::test]
async fn test_fetch_my_vote() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/posts/p1/my-vote"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "vote": "up" } })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/posts/p2/my-vote"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "vote": null } })),
        )
        .mount(&server)
        .await;

    assert_eq!(
        client.fetch_my_vote("p1").await.unwrap(),
        Some(VoteDirection::Up)
    );
    assert_eq!(client.fetch_my_vote("p2").await.unwrap(), None);
}

// ── Email / password ────────────────────────────────────────────────

#[tokio::test]
async fn test_login_returns_token_without_attaching_it() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/login"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "hunter22" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt.login",
            "refresh_token": "refresh.login",
            "user": { "id": "u1", "username": "ada", "display_name": "Ada", "email": "ada@example.com", "role": "user" }
        })))
        .mount(&server)
        .await;

    let session = client
        .login("ada@example.com", &secret("hunter22"))
        .await
        .unwrap();

    assert_eq!(session.token.expose_secret(), "jwt.login");
    assert_eq!(
        session.refresh_token.as_ref().map(ExposeSecret::expose_secret),
        Some("refresh.login")
    );
    assert!(!client.has_auth_token());
}

#[tokio::test]
async fn test_register_conflict() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/register"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": { "code": "DUPLICATE_EMAIL", "message": "Email already registered" }
        })))
        .mount(&server)
        .await;

    let request = RegisterRequest {
        email: "ada@example.com".into(),
        username: "ada".into(),
        display_name: "Ada".into(),
        password: secret("hunter22"),
    };
    let err = client.register(&request).await.unwrap_err();

    assert_eq!(err.server_message(), Some("Email already registered"));
}

// ── Error classification ────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_without_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    match client.fetch_me().await {
        Err(
            ref err @ Error::Api {
                status,
                ref code,
                ref message,
                ref body,
            },
        ) => {
            assert_eq!(status, 502);
            assert_eq!(*code, None);
            assert_eq!(*message, None);
            assert_eq!(body, "Bad Gateway");
            assert_eq!(err.server_message(), None);
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_html_error_page_is_kept_out_of_server_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/posts/p1/vote"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("content-type", "text/html")
                .set_body_string("<html><body><h1>403 Forbidden</h1></body></html>"),
        )
        .mount(&server)
        .await;

    let err = client.submit_vote("p1", VoteDirection::Up).await.unwrap_err();

    assert!(matches!(err, Error::Forbidden { message: None, ref body } if body.contains("403")));
    assert_eq!(err.server_message(), None);
}

#[tokio::test]
async fn test_malformed_success_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.fetch_me().await;
    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body.contains("oops")),
        "expected Deserialization error, got: {result:?}"
    );
}

#[test]
fn test_provider_authorize_url() {
    let client = ApiClient::with_client(
        reqwest::Client::new(),
        Url::parse("https://api.solvr.dev").unwrap(),
    );
    assert_eq!(
        client
            .provider_authorize_url(OAuthProvider::Github)
            .unwrap()
            .as_str(),
        "https://api.solvr.dev/v1/auth/github"
    );
}
