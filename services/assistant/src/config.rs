use teacher_assistant_core::auth::CredentialPolicy;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub credential_policy: CredentialPolicy,
    pub seed_groups: Vec<String>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://teacher_assistant.db".to_string());
        if database_url.trim().is_empty() {
            return Err(ConfigError::MissingVar("DATABASE_URL".to_string()));
        }

        let max_connections_str =
            std::env::var("DB_MAX_CONNECTIONS").unwrap_or_else(|_| "5".to_string());
        let max_connections = match max_connections_str.parse::<u32>() {
            Ok(n) if n >= 1 => n,
            _ => {
                return Err(ConfigError::InvalidValue(
                    "DB_MAX_CONNECTIONS".to_string(),
                    format!("'{}' is not a positive integer", max_connections_str),
                ));
            }
        };

        let legacy_str =
            std::env::var("LEGACY_PLAINTEXT_PASSWORDS").unwrap_or_else(|_| "true".to_string());
        let credential_policy = match legacy_str.to_lowercase().as_str() {
            "true" | "1" | "yes" => CredentialPolicy::AllowLegacyPlaintext,
            "false" | "0" | "no" => CredentialPolicy::HashedOnly,
            other => {
                return Err(ConfigError::InvalidValue(
                    "LEGACY_PLAINTEXT_PASSWORDS".to_string(),
                    format!("'{}' is not a boolean", other),
                ));
            }
        };

        let seed_groups = std::env::var("SEED_GROUPS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            database_url,
            max_connections,
            credential_policy,
            seed_groups,
            log_level,
        })
    }
}
