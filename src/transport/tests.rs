use super::message::{LoginResponse, PublishResponse};
use super::{AppState, bind, serve};
use crate::broker::{Heartbeat, Registry};
use crate::config::AuthSettings;
use reqwest::StatusCode;
use reqwest::header::{COOKIE, SET_COOKIE};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

const SECRET: &str = "transport-secret";

struct TestServer {
    base: String,
    registry: Arc<Registry>,
    http: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        let registry = Arc::new(Registry::new());
        let state = AppState::new(
            registry.clone(),
            AuthSettings {
                jwt_secret: SECRET.to_string(),
                token_ttl_secs: 60,
            },
        );

        let listener = bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local_addr");
        tokio::spawn(serve(listener, state));

        Self {
            base: format!("http://{addr}"),
            registry,
            http: reqwest::Client::new(),
        }
    }

    /// Log in and return the `token=...` cookie pair.
    async fn login(&self, username: &str) -> String {
        let resp = self
            .http
            .post(format!("{}/login", self.base))
            .json(&json!({ "username": username }))
            .send()
            .await
            .expect("login request");
        assert_eq!(resp.status(), StatusCode::OK);

        let set_cookie = resp
            .headers()
            .get(SET_COOKIE)
            .expect("set-cookie header")
            .to_str()
            .unwrap()
            .to_string();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn subscribe(&self, channel_id: &str, cookie: &str) -> EventReader {
        let resp = self
            .http
            .get(format!("{}/notifications/{channel_id}", self.base))
            .header(COOKIE, cookie)
            .send()
            .await
            .expect("subscribe request");
        assert_eq!(resp.status(), StatusCode::OK);
        EventReader {
            resp,
            buffer: String::new(),
        }
    }

    async fn publish(&self, channel_id: &str, body: Value) -> (StatusCode, Value) {
        let resp = self
            .http
            .post(format!("{}/broadcast/{channel_id}", self.base))
            .json(&body)
            .send()
            .await
            .expect("publish request");
        let status = resp.status();
        (status, resp.json().await.expect("json body"))
    }
}

/// Minimal SSE frame reader over a streaming response body.
struct EventReader {
    resp: reqwest::Response,
    buffer: String,
}

impl EventReader {
    /// Next `(event, data)` pair; multi-line data is joined with `\n`.
    async fn next_event(&mut self) -> (String, String) {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let block: String = self.buffer.drain(..end + 2).collect();
                let mut event = String::new();
                let mut data = Vec::new();
                for line in block.lines() {
                    if let Some(value) = line.strip_prefix("event:") {
                        event = value.trim_start().to_string();
                    } else if let Some(value) = line.strip_prefix("data:") {
                        data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
                    }
                }
                if event.is_empty() && data.is_empty() {
                    continue;
                }
                return (event, data.join("\n"));
            }

            let chunk = tokio::time::timeout(Duration::from_secs(5), self.resp.chunk())
                .await
                .expect("timed out waiting for SSE frame")
                .expect("body error")
                .expect("stream ended");
            self.buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    }
}

#[tokio::test]
async fn test_subscribe_then_publish_delivers_message() {
    let server = TestServer::start().await;
    let cookie = server.login("alice").await;
    let mut alice = server.subscribe("room1", &cookie).await;

    assert_eq!(
        alice.next_event().await,
        (
            "connected".to_string(),
            "connected to \"room1\" as alice".to_string()
        )
    );

    let (status, body) = server.publish("room1", json!({ "message": "hi" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "delivered": 1 }));

    assert_eq!(
        alice.next_event().await,
        ("message".to_string(), "hi".to_string())
    );
}

#[tokio::test]
async fn test_publish_to_unknown_channel_delivers_zero() {
    let server = TestServer::start().await;

    let (status, body) = server.publish("ghost", json!({ "message": "hi" })).await;

    assert_eq!(status, StatusCode::OK);
    let response: PublishResponse = serde_json::from_value(body).unwrap();
    assert_eq!(response, PublishResponse::ok(0));
    assert!(!server.registry.contains_channel("ghost"));
}

#[tokio::test]
async fn test_publish_non_string_message_is_client_error() {
    let server = TestServer::start().await;
    let cookie = server.login("alice").await;
    let mut alice = server.subscribe("room1", &cookie).await;
    alice.next_event().await;

    let (status, body) = server.publish("room1", json!({ "message": 42 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Message must be a string" }));

    // Nothing was queued: the next frame is the message published after.
    server.publish("room1", json!({ "message": "after" })).await;
    assert_eq!(
        alice.next_event().await,
        ("message".to_string(), "after".to_string())
    );
}

#[tokio::test]
async fn test_subscribers_on_other_channels_are_not_reached() {
    let server = TestServer::start().await;
    let alice_cookie = server.login("alice").await;
    let bob_cookie = server.login("bob").await;
    let mut alice = server.subscribe("room1", &alice_cookie).await;
    let mut bob = server.subscribe("room2", &bob_cookie).await;
    alice.next_event().await;
    bob.next_event().await;

    let (_, body) = server.publish("room2", json!({ "message": "for bob" })).await;
    assert_eq!(body["delivered"], 1);
    assert_eq!(
        bob.next_event().await,
        ("message".to_string(), "for bob".to_string())
    );

    server.publish("room1", json!({ "message": "for alice" })).await;
    assert_eq!(
        alice.next_event().await,
        ("message".to_string(), "for alice".to_string())
    );
}

#[tokio::test]
async fn test_heartbeat_reaches_open_stream() {
    let server = TestServer::start().await;
    let cookie = server.login("alice").await;
    let mut alice = server.subscribe("room1", &cookie).await;
    alice.next_event().await;

    let heartbeat = Heartbeat::new(server.registry.clone(), Heartbeat::DEFAULT_INTERVAL);
    assert_eq!(heartbeat.tick(), 1);

    assert_eq!(
        alice.next_event().await,
        ("ping".to_string(), "keep-alive".to_string())
    );
}

#[tokio::test]
async fn test_multiline_message_survives_framing() {
    let server = TestServer::start().await;
    let cookie = server.login("alice").await;
    let mut alice = server.subscribe("room1", &cookie).await;
    alice.next_event().await;

    server
        .publish("room1", json!({ "message": "line one\r\nline two" }))
        .await;

    assert_eq!(
        alice.next_event().await,
        ("message".to_string(), "line one\nline two".to_string())
    );
}

#[tokio::test]
async fn test_subscribe_without_cookie_is_unauthorized() {
    let server = TestServer::start().await;

    let resp = server
        .http
        .get(format!("{}/notifications/room1", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Unauthorized: No token" }));
    assert!(!server.registry.contains_channel("room1"));
}

#[tokio::test]
async fn test_subscribe_with_invalid_token_is_unauthorized() {
    let server = TestServer::start().await;

    let resp = server
        .http
        .get(format!("{}/notifications/room1", server.base))
        .header(COOKIE, "token=forged")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Invalid or expired token" }));
}

#[tokio::test]
async fn test_login_without_body_defaults_to_guest() {
    let server = TestServer::start().await;

    let resp = server
        .http
        .post(format!("{}/login", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let set_cookie = resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=60"));

    let body: LoginResponse = resp.json().await.unwrap();
    assert_eq!(body.username, "guest");
    assert_eq!(body.message, "Login successful");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let server = TestServer::start().await;

    let resp = server
        .http
        .post(format!("{}/logout", server.base))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let set_cookie = resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("token=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}


#[tokio::test]
async fn test_client_disconnect_deregisters_subscriber() {
    let server = TestServer::start().await;
    let cookie = server.login("alice").await;
    let mut alice = server.subscribe("room1", &cookie).await;
    alice.next_event().await;
    assert_eq!(server.registry.subscriber_count("room1"), 1);

    drop(alice);

    tokio::time::timeout(Duration::from_secs(5), async {
        while server.registry.subscriber_count("room1") > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscriber still registered after disconnect");

    assert!(server.registry.is_draining("room1"));
}
