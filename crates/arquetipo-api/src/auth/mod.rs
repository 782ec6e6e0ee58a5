//! # Authentication
//!
//! Per-request flow for protected routes:
//!
//! ```text
//! Unauthenticated → TokenPresented → SignatureValid? → ClaimsExtracted
//!     → UserLookup → UserActiveCheck → Authenticated | Rejected
//! ```
//!
//! - [`token`]: HS256 JWT issuance and cryptographic validation.
//! - [`password`]: Argon2id hashing and verification.
//! - [`middleware`]: bearer extraction, post-validation hooks (the
//!   active-user re-check is [`middleware::ActiveUserCheck`]) and the
//!   [`AuthenticatedUser`] extractor.

pub mod middleware;
pub mod password;
pub mod token;

pub use middleware::{require_bearer, ActiveUserCheck, AuthenticatedUser, TokenValidatedHook};
pub use password::PasswordHasher;
pub use token::{Claims, IssuedToken, TokenService};

/// Authentication failures. Everything except `Internal` maps to 401.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Se requiere un token de autenticación.")]
    MissingToken,

    #[error("Token inválido.")]
    InvalidToken,

    #[error("Token expirado.")]
    Expired,

    /// The token is valid but its user no longer exists or was deactivated.
    #[error("Usuario no encontrado o inactivo.")]
    UserRevoked,

    /// Login with unknown user, inactive user or wrong password. The same
    /// message is used for all three.
    #[error("Usuario o contraseña incorrectos.")]
    InvalidCredentials,

    #[error("{0}")]
    Internal(String),
}
