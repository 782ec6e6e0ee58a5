//! `GET /api/v1/UserJWT/userInfo`: identity claims of the bearer token.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthenticatedUser;
use crate::envelope::{ApiVersion, Encabezado};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserJwtData {
    pub id: i32,
    pub nombre_usuario: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    #[serde(flatten)]
    pub encabezado: Encabezado,
    pub users_jwt: UserJwtData,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/UserJWT/userInfo", get(user_info))
}

#[utoipa::path(
    get,
    path = "/api/v1/UserJWT/userInfo",
    responses(
        (status = 200, description = "Envelope header plus `usersJwt`", body = UserJwtData),
        (status = 401, description = "Missing, invalid, expired or revoked token", body = crate::error::ErrorBody),
    ),
    tag = "user-jwt"
)]
pub(crate) async fn user_info(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Json<UserInfoResponse> {
    tracing::info!(usuario = %user.nombre_usuario, "userInfo requested");
    Json(UserInfoResponse {
        encabezado: Encabezado::new(ApiVersion::V1, &state.config.host_name),
        users_jwt: UserJwtData {
            id: user.id,
            nombre_usuario: user.nombre_usuario,
            roles: user.roles,
        },
    })
}
