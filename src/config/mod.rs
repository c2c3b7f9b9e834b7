mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{AuthSettings, BrokerSettings, LoggingSettings, ServerSettings, Settings};

/// Loads the configuration from `config/default` and `BEACON__*` environment
/// variables (for example `BEACON__SERVER__PORT=9000`), then fills anything
/// left unset from `Settings::default()`.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix("BEACON")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
        },
        auth: AuthSettings {
            jwt_secret: partial
                .auth
                .as_ref()
                .and_then(|a| a.jwt_secret.clone())
                .unwrap_or(default.auth.jwt_secret),
            token_ttl_secs: partial
                .auth
                .as_ref()
                .and_then(|a| a.token_ttl_secs)
                .unwrap_or(default.auth.token_ttl_secs),
        },
        broker: BrokerSettings {
            heartbeat_interval_secs: partial
                .broker
                .as_ref()
                .and_then(|b| b.heartbeat_interval_secs)
                .unwrap_or(default.broker.heartbeat_interval_secs),
            reaper_grace_secs: partial
                .broker
                .as_ref()
                .and_then(|b| b.reaper_grace_secs)
                .unwrap_or(default.broker.reaper_grace_secs),
        },
        logging: LoggingSettings {
            level: partial
                .logging
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.logging.level),
        },
    })
}
