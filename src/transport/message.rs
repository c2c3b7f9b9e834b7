use serde::{Deserialize, Serialize};

/// Body of `POST /login`. A missing username logs in as `guest`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoginRequest {
    pub username: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub username: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Result of `POST /broadcast/:channel_id`.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PublishResponse {
    pub status: String,
    pub delivered: usize,
}

impl PublishResponse {
    pub fn ok(delivered: usize) -> Self {
        Self {
            status: "ok".to_string(),
            delivered,
        }
    }
}
