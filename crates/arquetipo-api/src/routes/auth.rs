//! # Login and Registration
//!
//! `POST /api/Auth/login` issues a one-hour JWT. `POST /api/Auth/register`
//! creates an active user with an Argon2id password hash. Neither requires
//! a token.

use arquetipo_core::Usuario;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthError;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::repository::NuevoUsuario;
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(alias = "NombreUsuario")]
    pub nombre_usuario: String,
    #[serde(alias = "Password")]
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.nombre_usuario.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::Validation(
                "El modelo de login no es válido.".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expiration: DateTime<Utc>,
    pub nombre_usuario: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(alias = "NombreUsuario")]
    pub nombre_usuario: String,
    #[serde(alias = "Password")]
    pub password: String,
    /// Comma-separated roles.
    #[serde(alias = "Roles")]
    pub roles: Option<String>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), AppError> {
        Ok(Usuario::validate_registro(&self.nombre_usuario, &self.password)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub usuario_id: i32,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/Auth/login", post(login))
        .route("/api/Auth/register", post(register))
}

/// POST /api/Auth/login: Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/Auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorBody),
        (status = 401, description = "Wrong credentials or inactive user", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let req: LoginRequest = extract_validated_json(body)?;
    let nombre = Usuario::normalizar_nombre(&req.nombre_usuario);
    tracing::info!(usuario = %nombre, "login attempt");

    let usuario = match state.usuarios.find_by_nombre(nombre).await? {
        Some(u) if u.esta_activo => u,
        _ => {
            // Same Argon2 cost as a wrong password.
            state.passwords.verify_dummy(req.password).await?;
            tracing::warn!(usuario = %nombre, "login failed: unknown or inactive user");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    if !state
        .passwords
        .verify(req.password, usuario.password_hash.clone())
        .await?
    {
        tracing::warn!(usuario = %nombre, "login failed: wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let issued = state.tokens.issue(&usuario)?;
    tracing::info!(usuario = %usuario.nombre_usuario, "login succeeded");

    Ok(Json(LoginResponse {
        token: issued.token,
        expiration: issued.expiration,
        nombre_usuario: usuario.nombre_usuario,
    }))
}

/// POST /api/Auth/register: Create an active user.
#[utoipa::path(
    post,
    path = "/api/Auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorBody),
        (status = 409, description = "Username taken", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let req: RegisterRequest = extract_validated_json(body)?;
    let nombre = Usuario::normalizar_nombre(&req.nombre_usuario).to_string();
    tracing::info!(usuario = %nombre, "registration attempt");

    let password_hash = state.passwords.hash(req.password).await?;
    let usuario = state
        .usuarios
        .create(NuevoUsuario {
            nombre_usuario: nombre.clone(),
            password_hash,
            roles: req.roles.filter(|r| !r.trim().is_empty()),
        })
        .await
        .map_err(|e| {
            tracing::warn!(usuario = %nombre, error = %e, "registration failed");
            e
        })?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Usuario registrado exitosamente.".into(),
            usuario_id: usuario.id,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_both_fields() {
        let req: LoginRequest = serde_json::from_str(r#"{"NombreUsuario":"ana"}"#).unwrap();
        assert!(req.validate().is_err());
        let req: LoginRequest =
            serde_json::from_str(r#"{"nombreUsuario":"ana","password":"x"}"#).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn register_enforces_lengths() {
        let short = RegisterRequest {
            nombre_usuario: "ab".into(),
            password: "secreto".into(),
            roles: None,
        };
        assert!(matches!(short.validate(), Err(AppError::Validation(_))));

        let weak = RegisterRequest {
            nombre_usuario: "ana".into(),
            password: "123".into(),
            roles: None,
        };
        assert!(weak.validate().is_err());
    }
}
