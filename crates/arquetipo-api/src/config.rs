//! # Service Configuration
//!
//! Read once from the environment at startup. See [`AppConfig::from_env`]
//! for the variables.

use zeroize::Zeroizing;

/// Minimum HMAC key length accepted for HS256 signing.
pub const MIN_JWT_KEY_LEN: usize = 32;

/// Default issuer (and audience) for issued tokens.
pub const DEFAULT_JWT_ISSUER: &str = "Arquetipo.Api";

/// Deployment environment. Controls error verbosity and the CSP profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse `APP_ENV`. Anything other than a development spelling is
    /// treated as production.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Self::Development,
            _ => Self::Production,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "Development",
            Self::Production => "Production",
        }
    }
}

/// JWT signing settings. The issuer doubles as the audience.
#[derive(Clone)]
pub struct JwtSettings {
    pub key: Zeroizing<String>,
    pub issuer: String,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("key", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: Environment,
    /// Reported as `hostName` in response envelopes.
    pub host_name: String,
    pub jwt: JwtSettings,
}

impl AppConfig {
    /// Production defaults around an explicit signing key.
    pub fn new(jwt_key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = Zeroizing::new(jwt_key.into());
        if key.len() < MIN_JWT_KEY_LEN {
            return Err(ConfigError::JwtKeyTooShort {
                min: MIN_JWT_KEY_LEN,
            });
        }
        Ok(Self {
            port: 8080,
            environment: Environment::Production,
            host_name: "unknown".to_string(),
            jwt: JwtSettings {
                key,
                issuer: DEFAULT_JWT_ISSUER.to_string(),
            },
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `JWT_KEY` (required, at least 32 bytes)
    /// - `JWT_ISSUER` (default: `Arquetipo.Api`)
    /// - `PORT` (default: 8080)
    /// - `APP_ENV` (default: `Production`)
    /// - `HOSTNAME` (default: `unknown`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let key = std::env::var("JWT_KEY").map_err(|_| ConfigError::MissingJwtKey)?;
        let mut config = Self::new(key)?;

        if let Ok(port) = std::env::var("PORT") {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Ok(env) = std::env::var("APP_ENV") {
            config.environment = Environment::parse(&env);
        }
        if let Some(host) = std::env::var("HOSTNAME").ok().filter(|h| !h.is_empty()) {
            config.host_name = host;
        }
        if let Some(issuer) = std::env::var("JWT_ISSUER").ok().filter(|i| !i.is_empty()) {
            config.jwt.issuer = issuer;
        }
        Ok(config)
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_KEY environment variable is required")]
    MissingJwtKey,
    #[error("JWT key must be at least {min} bytes")]
    JwtKeyTooShort { min: usize },
    #[error("invalid PORT value: {0}")]
    InvalidPort(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parsing() {
        assert_eq!(Environment::parse("Development"), Environment::Development);
        assert_eq!(Environment::parse(" dev "), Environment::Development);
        assert_eq!(Environment::parse("Production"), Environment::Production);
        assert_eq!(Environment::parse("staging"), Environment::Production);
    }

    #[test]
    fn short_key_is_rejected() {
        assert!(matches!(
            AppConfig::new("corta"),
            Err(ConfigError::JwtKeyTooShort { min: 32 })
        ));
    }

    #[test]
    fn debug_redacts_key() {
        let cfg = AppConfig::new("k".repeat(40)).unwrap();
        let debug = format!("{cfg:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(&"k".repeat(40)));
        assert_eq!(cfg.jwt.issuer, DEFAULT_JWT_ISSUER);
        assert_eq!(cfg.environment, Environment::Production);
    }
}
