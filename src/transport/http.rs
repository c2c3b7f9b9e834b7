//! HTTP surface
//!
//! Routes:
//! - `POST /login` issues the `token` cookie
//! - `POST /logout` clears it
//! - `GET /notifications/:channel_id` opens an SSE subscription (needs the cookie)
//! - `POST /broadcast/:channel_id` publishes `{ "message": <string> }`
//!
//! Handlers are thin: validation and fan-out live in the broker, token
//! handling in `auth`.

use std::sync::Arc;

use axum::extract::{FromRef, Path, State};
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::auth::{login_cookie, logout_cookie, sign};
use crate::broker::{Dispatcher, Registry};
use crate::config::AuthSettings;
use crate::transport::message::{LoginRequest, LoginResponse, LogoutResponse, PublishResponse};
use crate::transport::sse;
use crate::utils::error::Result;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub dispatcher: Dispatcher,
    pub auth: AuthSettings,
}

impl AppState {
    pub fn new(registry: Arc<Registry>, auth: AuthSettings) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry.clone()),
            registry,
            auth,
        }
    }
}

impl FromRef<AppState> for AuthSettings {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/notifications/:channel_id", get(sse::subscribe))
        .route("/broadcast/:channel_id", post(publish))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn bind(addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on http://{}", listener.local_addr()?);
    Ok(listener)
}

/// Serve the router on `listener` until the server stops.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn publish(
    Path(channel_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<PublishResponse>> {
    let delivered = state.dispatcher.publish(&channel_id, &body)?;
    Ok(Json(PublishResponse::ok(delivered)))
}

async fn login(
    State(state): State<AppState>,
    body: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let username = request
        .username
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "guest".to_string());

    let token = sign(&username, &state.auth.jwt_secret, state.auth.token_ttl_secs)?;
    info!(principal = %username, "login");

    Ok((
        AppendHeaders([(SET_COOKIE, login_cookie(&token, state.auth.token_ttl_secs))]),
        Json(LoginResponse {
            message: "Login successful".to_string(),
            username,
        }),
    ))
}

async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, logout_cookie())]),
        Json(LogoutResponse {
            message: "Logged out".to_string(),
        }),
    )
}
