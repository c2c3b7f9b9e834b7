use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub broker: BrokerSettings,
    pub logging: LoggingSettings,
}

/// Address the HTTP server binds to.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Token signing for the login endpoint and the subscribe extractor.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

/// Timers of the broker.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub heartbeat_interval_secs: u64,
    pub reaper_grace_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl BrokerSettings {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn reaper_grace(&self) -> Duration {
        Duration::from_secs(self.reaper_grace_secs)
    }
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub auth: Option<PartialAuthSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialAuthSettings {
    pub jwt_secret: Option<String>,
    pub token_ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub heartbeat_interval_secs: Option<u64>,
    pub reaper_grace_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

/// Provides default values for `Settings`.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            auth: AuthSettings {
                jwt_secret: "change-me".to_string(),
                token_ttl_secs: 7200,
            },
            broker: BrokerSettings {
                heartbeat_interval_secs: 30,
                reaper_grace_secs: 10,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}
