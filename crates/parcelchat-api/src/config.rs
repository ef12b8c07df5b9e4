use chrono::format::{Item, StrftimeItems};
use config::{Config as ConfigLoader, ConfigError, File};
use parcelchat_core::{ClosedThreadPolicy, IngestionConfig};
use parcelchat_types::Role;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub mongodb: MongoDbConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoDbConfig {
    pub database: String,
}

impl Default for MongoDbConfig {
    fn default() -> Self {
        Self {
            database: "parcelchat".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub closed_thread_policy: ClosedThreadPolicy,
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// strftime pattern for the display `createdAt`, rendered in server-local time
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

impl ChatConfig {
    pub fn ingestion(&self) -> IngestionConfig {
        IngestionConfig {
            closed_thread_policy: self.closed_thread_policy,
            max_message_length: self.max_message_length,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            closed_thread_policy: ClosedThreadPolicy::default(),
            max_message_length: default_max_message_length(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

fn default_max_message_length() -> usize {
    2000
}

fn default_timestamp_format() -> String {
    "%d.%m.%Y, %H:%M:%S".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub admin_tokens: Vec<String>,
    #[serde(default)]
    pub user_tokens: Vec<String>,
}

impl AuthConfig {
    /// Role bound to a bearer token, None for unknown tokens
    pub fn role_for(&self, token: &str) -> Option<Role> {
        if self.admin_tokens.iter().any(|t| t == token) {
            Some(Role::Admin)
        } else if self.user_tokens.iter().any(|t| t == token) {
            Some(Role::User)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Scalar settings that can be overridden from the environment
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("SERVER_REQUEST_TIMEOUT_SECS", "server.request_timeout_secs"),
    ("CORS_ENABLED", "cors.enabled"),
    ("STORAGE_BACKEND", "storage.backend"),
    ("MONGODB_DATABASE", "mongodb.database"),
    ("CHAT_CLOSED_THREAD_POLICY", "chat.closed_thread_policy"),
    ("CHAT_MAX_MESSAGE_LENGTH", "chat.max_message_length"),
    ("CHAT_TIMESTAMP_FORMAT", "chat.timestamp_format"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
];

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (SERVER_, STORAGE_, MONGODB_, CHAT_, AUTH_, LOG_ prefixes)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let mut builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));

        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        if let Ok(tokens) = std::env::var("AUTH_ADMIN_TOKENS") {
            cfg.auth.admin_tokens = split_list(&tokens);
        }
        if let Ok(tokens) = std::env::var("AUTH_USER_TOKENS") {
            cfg.auth.user_tokens = split_list(&tokens);
        }
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            cfg.cors.origins = split_list(&origins);
        }

        // Load secrets from ENV (not in TOML)
        if cfg.storage.backend == StorageBackend::Mongodb {
            cfg.mongodb_uri = std::env::var("MONGODB_URI").map_err(|_| {
                ConfigError::Message("MONGODB_URI environment variable is required".to_string())
            })?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let cfg: Config = ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chat.max_message_length == 0 {
            return Err(ConfigError::Message(
                "chat.max_message_length must be positive".to_string(),
            ));
        }
        if StrftimeItems::new(&self.chat.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Message(format!(
                "chat.timestamp_format is not a valid strftime pattern: {}",
                self.chat.timestamp_format
            )));
        }
        Ok(())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
