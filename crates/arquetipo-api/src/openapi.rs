//! # OpenAPI Document
//!
//! Collects the utoipa-annotated handlers into one document served at
//! `/openapi.json`. Util handlers are shared by both versions and are
//! documented under their V1 path.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Registers the `bearer_auth` JWT scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Token from POST /api/Auth/login. Required by /api/v1/UserJWT and /api/v{1,2}/Util.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Arquetipo API",
        version = "0.1.0",
        description = "Versioned cliente CRUD, JWT login and registration, and exchange-rate and legal-holiday lookups proxied from the Operaciones service.\n\nCliente and Auth routes are anonymous. UserJWT and Util routes take `Authorization: Bearer <token>`; the token is rejected once its user is deactivated.",
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // ── Cliente V1 ──────────────────────────────────────────────────
        crate::routes::clientes::listar_v1,
        crate::routes::clientes::obtener_v1,
        crate::routes::clientes::buscar_v1,
        crate::routes::clientes::crear_v1,
        crate::routes::clientes::actualizar_v1,
        crate::routes::clientes::eliminar_v1,
        // ── Cliente V2 ──────────────────────────────────────────────────
        crate::routes::clientes::listar_v2,
        crate::routes::clientes::obtener_v2,
        crate::routes::clientes::buscar_v2,
        crate::routes::clientes::crear_v2,
        crate::routes::clientes::actualizar_v2,
        crate::routes::clientes::eliminar_v2,
        // ── Auth ────────────────────────────────────────────────────────
        crate::routes::auth::login,
        crate::routes::auth::register,
        // ── Bearer-protected ────────────────────────────────────────────
        crate::routes::user_jwt::user_info,
        crate::routes::util::tasa_de_cambio,
        crate::routes::util::feriados_legales,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            crate::envelope::Encabezado,
            crate::envelope::MensajeResponse,
            crate::routes::clientes::ClienteV1,
            crate::routes::clientes::ClienteV2,
            crate::routes::clientes::CrearClienteV1,
            crate::routes::clientes::CrearClienteV2,
            crate::routes::clientes::ActualizarClienteV1,
            crate::routes::clientes::ActualizarClienteV2,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::LoginResponse,
            crate::routes::auth::RegisterRequest,
            crate::routes::auth::RegisterResponse,
            crate::routes::user_jwt::UserJwtData,
        ),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "cliente-v1", description = "Cliente CRUD, V1 shape. Updates replace every field."),
        (name = "cliente-v2", description = "Cliente CRUD, V2 shape with telefono. Updates merge non-empty fields."),
        (name = "auth", description = "Login and registration"),
        (name = "user-jwt", description = "Claims of the presented token"),
        (name = "util", description = "Operaciones lookups: exchange rates and legal holidays"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Arquetipo API");
        assert_eq!(spec.info.version, "0.1.0");
    }

    #[test]
    fn spec_has_both_cliente_versions() {
        let spec = ApiDoc::openapi();
        for path in [
            "/api/v1/cliente",
            "/api/v1/cliente/{id}",
            "/api/v1/cliente/buscar",
            "/api/v2/cliente",
            "/api/v2/cliente/{id}",
            "/api/v2/cliente/buscar",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn spec_has_auth_and_util_paths() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/api/Auth/login"));
        assert!(spec.paths.paths.contains_key("/api/Auth/register"));
        assert!(spec.paths.paths.contains_key("/api/v1/UserJWT/userInfo"));
        assert!(spec.paths.paths.contains_key("/api/v1/Util/tasa-de-cambio"));
        assert!(spec.paths.paths.contains_key("/api/v1/Util/feriados-legales"));
    }

    #[test]
    fn spec_declares_bearer_scheme() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
