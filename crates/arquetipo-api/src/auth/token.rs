//! JWT issuance and validation (HS256).

use std::sync::Arc;

use arquetipo_core::Usuario;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;
use crate::config::JwtSettings;

/// Lifetime of every issued token.
pub const TOKEN_TTL_HOURS: i64 = 1;

/// Token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    pub sub: String,
    /// Unique token id.
    pub jti: String,
    /// User id.
    pub uid: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// A freshly signed token and its expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expiration: DateTime<Utc>,
}

/// Signs and validates tokens. The issuer is also the required audience.
#[derive(Clone)]
pub struct TokenService {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    issuer: Arc<str>,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(settings.key.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(settings.key.as_bytes())),
            issuer: Arc::from(settings.issuer.as_str()),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Issue a one-hour token for `usuario`.
    pub fn issue(&self, usuario: &Usuario) -> Result<IssuedToken, AuthError> {
        self.issue_at(usuario, Utc::now())
    }

    fn issue_at(&self, usuario: &Usuario, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let expiration = now + Duration::hours(TOKEN_TTL_HOURS);
        let claims = Claims {
            sub: usuario.nombre_usuario.clone(),
            jti: Uuid::new_v4().to_string(),
            uid: usuario.id,
            roles: usuario.roles(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: self.issuer.to_string(),
            aud: self.issuer.to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            tracing::error!("Failed to encode JWT: {e}");
            AuthError::Internal("token signing failed".into())
        })?;

        Ok(IssuedToken { token, expiration })
    }

    /// Check signature, expiry, issuer and audience.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&*self.issuer]);
        validation.set_audience(&[&*self.issuer]);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {e}");
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                    _ => AuthError::InvalidToken,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeroize::Zeroizing;

    fn settings(issuer: &str) -> JwtSettings {
        JwtSettings {
            key: Zeroizing::new("clave-de-prueba-de-al-menos-32-bytes!!".into()),
            issuer: issuer.into(),
        }
    }

    fn usuario(roles: Option<&str>) -> Usuario {
        Usuario {
            id: 7,
            nombre_usuario: "ana".into(),
            password_hash: String::new(),
            roles: roles.map(String::from),
            esta_activo: true,
        }
    }

    #[test]
    fn issued_token_validates_with_expected_claims() {
        let svc = TokenService::new(&settings("Arquetipo.Api"));
        let issued = svc.issue(&usuario(Some("Admin, Lector"))).unwrap();
        let claims = svc.validate(&issued.token).unwrap();

        assert_eq!(claims.sub, "ana");
        assert_eq!(claims.uid, 7);
        assert_eq!(claims.roles, vec!["Admin", "Lector"]);
        assert_eq!(claims.iss, "Arquetipo.Api");
        assert_eq!(claims.aud, "Arquetipo.Api");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.exp, issued.expiration.timestamp());
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn token_ids_are_unique() {
        let svc = TokenService::new(&settings("Arquetipo.Api"));
        let a = svc.validate(&svc.issue(&usuario(None)).unwrap().token).unwrap();
        let b = svc.validate(&svc.issue(&usuario(None)).unwrap().token).unwrap();
        assert_ne!(a.jti, b.jti);
        assert!(a.roles.is_empty());
    }

    #[test]
    fn other_issuer_is_rejected() {
        let emisor = TokenService::new(&settings("Otro.Emisor"));
        let svc = TokenService::new(&settings("Arquetipo.Api"));
        let issued = emisor.issue(&usuario(None)).unwrap();
        assert_eq!(svc.validate(&issued.token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let svc = TokenService::new(&settings("Arquetipo.Api"));
        let issued = svc
            .issue_at(&usuario(None), Utc::now() - Duration::hours(2))
            .unwrap();
        assert_eq!(svc.validate(&issued.token), Err(AuthError::Expired));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let svc = TokenService::new(&settings("Arquetipo.Api"));
        let mut token = svc.issue(&usuario(None)).unwrap().token;
        token.push('x');
        assert_eq!(svc.validate(&token), Err(AuthError::InvalidToken));
        assert_eq!(svc.validate("no.es.jwt"), Err(AuthError::InvalidToken));
    }
}
