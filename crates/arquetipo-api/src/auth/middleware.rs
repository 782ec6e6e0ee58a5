//! Bearer authentication for protected routes.
//!
//! [`require_bearer`] validates the token with [`TokenService`], runs every
//! registered [`TokenValidatedHook`] and injects an [`AuthenticatedUser`]
//! into the request extensions. Handlers read it through the
//! `FromRequestParts` impl.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use super::{AuthError, Claims};
use crate::error::AppError;
use crate::repository::UsuarioRepository;
use crate::state::AppState;

/// Runs after a token passed signature, expiry, issuer and audience checks.
/// Any error rejects the request with 401.
#[async_trait]
pub trait TokenValidatedHook: Send + Sync {
    async fn on_validated(&self, claims: &Claims) -> Result<(), AuthError>;
}

/// Rejects tokens whose user was removed or deactivated after issuance.
#[derive(Clone)]
pub struct ActiveUserCheck {
    usuarios: Arc<dyn UsuarioRepository>,
}

impl ActiveUserCheck {
    pub fn new(usuarios: Arc<dyn UsuarioRepository>) -> Self {
        Self { usuarios }
    }
}

#[async_trait]
impl TokenValidatedHook for ActiveUserCheck {
    async fn on_validated(&self, claims: &Claims) -> Result<(), AuthError> {
        let usuario = self
            .usuarios
            .find_by_nombre(&claims.sub)
            .await
            .map_err(|e| AuthError::Internal(format!("user lookup failed: {e}")))?;

        match usuario {
            Some(u) if u.esta_activo => Ok(()),
            Some(_) => {
                tracing::warn!(usuario = %claims.sub, jti = %claims.jti, "token rejected: user is inactive");
                Err(AuthError::UserRevoked)
            }
            None => {
                tracing::warn!(usuario = %claims.sub, jti = %claims.jti, "token rejected: user no longer exists");
                Err(AuthError::UserRevoked)
            }
        }
    }
}

/// Identity of the caller behind a validated bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub nombre_usuario: String,
    pub roles: Vec<String>,
    pub token_id: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.uid,
            nombre_usuario: claims.sub,
            roles: claims.roles,
            token_id: claims.jti,
        }
    }
}

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::from(AuthError::MissingToken))
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("Bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::InvalidToken),
    }
}

/// Middleware for routes that need a bearer token.
///
/// Mount with `axum::middleware::from_fn_with_state`.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = bearer_token(request.headers())
        .and_then(|token| state.tokens.validate(token))
        .map_err(|e| {
            tracing::warn!(reason = %e, "authentication failed");
            e
        })?;

    for hook in state.token_hooks.iter() {
        hook.on_validated(&claims).await?;
    }

    request
        .extensions_mut()
        .insert(AuthenticatedUser::from(claims));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryUsuarioRepository, NuevoUsuario};
    use axum::http::HeaderValue;

    fn claims(sub: &str) -> Claims {
        Claims {
            sub: sub.into(),
            jti: "jti-1".into(),
            uid: 1,
            roles: vec!["Admin".into()],
            iat: 0,
            exp: 0,
            iss: "Arquetipo.Api".into(),
            aud: "Arquetipo.Api".into(),
        }
    }

    async fn repo_with(nombre: &str) -> Arc<MemoryUsuarioRepository> {
        let repo = Arc::new(MemoryUsuarioRepository::new());
        repo.create(NuevoUsuario {
            nombre_usuario: nombre.into(),
            password_hash: "hash".into(),
            roles: None,
        })
        .await
        .unwrap();
        repo
    }

    #[tokio::test]
    async fn active_user_passes() {
        let check = ActiveUserCheck::new(repo_with("ana").await);
        assert_eq!(check.on_validated(&claims("ana")).await, Ok(()));
    }

    #[tokio::test]
    async fn deactivated_user_is_revoked() {
        let repo = repo_with("ana").await;
        let check = ActiveUserCheck::new(repo.clone());
        assert!(repo.set_activo("ana", false).await.unwrap());
        assert_eq!(check.on_validated(&claims("ana")).await, Err(AuthError::UserRevoked));
    }

    #[tokio::test]
    async fn unknown_user_is_revoked() {
        let check = ActiveUserCheck::new(repo_with("ana").await);
        assert_eq!(check.on_validated(&claims("otro")).await, Err(AuthError::UserRevoked));
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), Err(AuthError::MissingToken));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), Err(AuthError::InvalidToken));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), Err(AuthError::InvalidToken));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Ok("abc.def.ghi"));
    }

    #[test]
    fn authenticated_user_from_claims() {
        let user = AuthenticatedUser::from(claims("ana"));
        assert_eq!(user.id, 1);
        assert_eq!(user.nombre_usuario, "ana");
        assert_eq!(user.roles, vec!["Admin"]);
        assert_eq!(user.token_id, "jti-1");
    }
}
