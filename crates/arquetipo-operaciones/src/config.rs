//! Operaciones client configuration.
//!
//! The base URL is required; Basic credentials are optional and only sent
//! when both halves are present.

use url::Url;
use zeroize::Zeroizing;

/// Configuration for connecting to the Operaciones service.
///
/// Custom `Debug` implementation redacts the password.
#[derive(Clone)]
pub struct OperacionesConfig {
    /// Service root. Always ends with `/` so relative paths join under it.
    pub base_url: Url,
    pub usuario: Option<String>,
    pub password: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for OperacionesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperacionesConfig")
            .field("base_url", &self.base_url)
            .field("usuario", &self.usuario)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl OperacionesConfig {
    /// Build a configuration from an explicit base URL, without credentials.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("base_url", base_url)?,
            usuario: None,
            password: None,
        })
    }

    /// Attach Basic credentials.
    pub fn with_credentials(mut self, usuario: impl Into<String>, password: impl Into<String>) -> Self {
        self.usuario = Some(usuario.into());
        self.password = Some(Zeroizing::new(password.into()));
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `OPERACIONES_URL` (required)
    /// - `OPERACIONES_USUARIO` (optional)
    /// - `OPERACIONES_PASSWORD` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("OPERACIONES_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingUrl)?;

        Ok(Self {
            base_url: parse_base_url("OPERACIONES_URL", &raw)?,
            usuario: non_empty_env("OPERACIONES_USUARIO"),
            password: non_empty_env("OPERACIONES_PASSWORD").map(Zeroizing::new),
        })
    }

    /// Credentials to send, if both user and password are configured.
    pub(crate) fn basic_credentials(&self) -> Option<(&str, &str)> {
        match (&self.usuario, &self.password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some((u.as_str(), p.as_str())),
            _ => None,
        }
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

/// Parse a base URL and guarantee a trailing slash on its path, so that
/// `Url::join("service/...")` appends instead of replacing the last segment.
fn parse_base_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(
            name.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("OPERACIONES_URL environment variable is required")]
    MissingUrl,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
