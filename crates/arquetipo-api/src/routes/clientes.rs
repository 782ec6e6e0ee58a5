//! # Cliente API, versions 1 and 2
//!
//! Both versions share [`ClienteHandler`]; they differ in their request and
//! response shapes:
//!
//! | | V1 | V2 |
//! |---|---|---|
//! | `telefono` on create | required | optional (`"N/A"` when absent) |
//! | update | full replace | merge-patch |
//! | search fields | nombre, apellido, email, telefono | nombre, apellido, email |
//! | extra fields | none | estadoCivil, preferenciaContacto, fechaRegistro |
//!
//! Request bodies accept camelCase and PascalCase field names.

use arquetipo_core::{Cliente, ClienteCambios, CriteriosBusqueda, NuevoCliente, Paginacion};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::envelope::{ApiVersion, DataResponse, MensajeResponse};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_query, Validate};
use crate::state::AppState;

/// Message for a PUT body without `id`.
pub const ID_REQUERIDO: &str = "Datos de cliente inválidos o ID nulo.";

// ── Views ───────────────────────────────────────────────────────────

/// Cliente as exposed by V1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClienteV1 {
    pub id: i32,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub telefono: String,
}

impl From<Cliente> for ClienteV1 {
    fn from(c: Cliente) -> Self {
        Self {
            id: c.id,
            nombre: c.nombre,
            apellido: c.apellido,
            email: c.email,
            telefono: c.telefono,
        }
    }
}

/// Cliente as exposed by V2. `telefono` is omitted when not on file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClienteV2 {
    pub id: i32,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado_civil: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferencia_contacto: Option<String>,
    pub fecha_registro: DateTime<Utc>,
}

impl From<Cliente> for ClienteV2 {
    fn from(c: Cliente) -> Self {
        let telefono = c.telefono_disponible().map(String::from);
        Self {
            id: c.id,
            nombre: c.nombre,
            apellido: c.apellido,
            email: c.email,
            telefono,
            estado_civil: c.estado_civil,
            preferencia_contacto: c.preferencia_contacto,
            fecha_registro: c.fecha_registro,
        }
    }
}

// ── Requests ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListarParams {
    #[serde(alias = "Page")]
    pub page: Option<i64>,
    #[serde(rename = "pageSize", alias = "PageSize")]
    pub page_size: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BuscarParamsV1 {
    #[serde(alias = "Nombre")]
    pub nombre: Option<String>,
    #[serde(alias = "Apellido")]
    pub apellido: Option<String>,
    #[serde(alias = "Email")]
    pub email: Option<String>,
    #[serde(alias = "Telefono")]
    pub telefono: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BuscarParamsV2 {
    #[serde(alias = "Nombre")]
    pub nombre: Option<String>,
    #[serde(alias = "Apellido")]
    pub apellido: Option<String>,
    #[serde(alias = "Email")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CrearClienteV1 {
    #[serde(alias = "Nombre")]
    pub nombre: String,
    #[serde(alias = "Apellido")]
    pub apellido: String,
    #[serde(alias = "Email")]
    pub email: String,
    #[serde(alias = "Telefono")]
    pub telefono: String,
}

impl From<CrearClienteV1> for NuevoCliente {
    fn from(r: CrearClienteV1) -> Self {
        NuevoCliente::new(r.nombre, r.apellido, r.email, r.telefono)
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CrearClienteV2 {
    #[serde(alias = "Nombre")]
    pub nombre: String,
    #[serde(alias = "Apellido")]
    pub apellido: String,
    #[serde(alias = "Email")]
    pub email: String,
    #[serde(alias = "Telefono")]
    pub telefono: Option<String>,
    #[serde(alias = "EstadoCivil")]
    pub estado_civil: Option<String>,
    #[serde(alias = "PreferenciaContacto")]
    pub preferencia_contacto: Option<String>,
}

impl From<CrearClienteV2> for NuevoCliente {
    fn from(r: CrearClienteV2) -> Self {
        let mut nuevo = NuevoCliente::con_telefono_opcional(r.nombre, r.apellido, r.email, r.telefono);
        nuevo.estado_civil = r.estado_civil.filter(|v| !v.trim().is_empty());
        nuevo.preferencia_contacto = r.preferencia_contacto.filter(|v| !v.trim().is_empty());
        nuevo
    }
}

/// V1 update: every contact field is overwritten.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ActualizarClienteV1 {
    #[serde(alias = "Id")]
    pub id: Option<i32>,
    #[serde(alias = "Nombre")]
    pub nombre: String,
    #[serde(alias = "Apellido")]
    pub apellido: String,
    #[serde(alias = "Email")]
    pub email: String,
    #[serde(alias = "Telefono")]
    pub telefono: String,
}

impl Validate for ActualizarClienteV1 {
    fn validate(&self) -> Result<(), AppError> {
        if self.id.is_none() {
            return Err(AppError::Validation(ID_REQUERIDO.into()));
        }
        Ok(())
    }
}

impl ActualizarClienteV1 {
    fn into_cambios(self) -> ClienteCambios {
        ClienteCambios::reemplazo(self.nombre, self.apellido, self.email, self.telefono)
    }
}

/// V2 update: only the non-blank fields are applied.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ActualizarClienteV2 {
    #[serde(alias = "Id")]
    pub id: Option<i32>,
    #[serde(alias = "Nombre")]
    pub nombre: Option<String>,
    #[serde(alias = "Apellido")]
    pub apellido: Option<String>,
    #[serde(alias = "Email")]
    pub email: Option<String>,
    #[serde(alias = "Telefono")]
    pub telefono: Option<String>,
    #[serde(alias = "EstadoCivil")]
    pub estado_civil: Option<String>,
    #[serde(alias = "PreferenciaContacto")]
    pub preferencia_contacto: Option<String>,
}

impl Validate for ActualizarClienteV2 {
    fn validate(&self) -> Result<(), AppError> {
        if self.id.is_none() {
            return Err(AppError::Validation(ID_REQUERIDO.into()));
        }
        Ok(())
    }
}

impl ActualizarClienteV2 {
    fn into_cambios(self) -> ClienteCambios {
        ClienteCambios::parcial(
            self.nombre,
            self.apellido,
            self.email,
            self.telefono,
            self.estado_civil,
            self.preferencia_contacto,
        )
    }
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/cliente",
            get(listar_v1).post(crear_v1).put(actualizar_v1),
        )
        .route("/api/v1/cliente/buscar", get(buscar_v1))
        .route("/api/v1/cliente/:id", get(obtener_v1).delete(eliminar_v1))
        .route(
            "/api/v2/cliente",
            get(listar_v2).post(crear_v2).put(actualizar_v2),
        )
        .route("/api/v2/cliente/buscar", get(buscar_v2))
        .route("/api/v2/cliente/:id", get(obtener_v2).delete(eliminar_v2))
}

fn paginacion(params: Result<Query<ListarParams>, QueryRejection>) -> Result<Paginacion, AppError> {
    let params = extract_query(params)?;
    Ok(Paginacion::new(params.page, params.page_size))
}

/// Non-numeric path ids are treated like unknown ids.
fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

fn envelope<T: Serialize + From<Cliente>>(
    state: &AppState,
    version: ApiVersion,
    clientes: Vec<Cliente>,
) -> DataResponse<T> {
    DataResponse::new(
        version,
        &state.config.host_name,
        clientes.into_iter().map(T::from).collect(),
    )
}

async fn crear(
    state: &AppState,
    version: ApiVersion,
    clientes: Vec<NuevoCliente>,
) -> Result<(StatusCode, Json<MensajeResponse>), AppError> {
    tracing::info!(version = version.label(), count = clientes.len(), "creating clientes");
    state.clientes.create(clientes).await?;
    Ok((
        StatusCode::CREATED,
        Json(MensajeResponse::new(format!(
            "Clientes {} creados exitosamente.",
            version.nombre()
        ))),
    ))
}

async fn actualizar(
    state: &AppState,
    version: ApiVersion,
    id: Option<i32>,
    cambios: ClienteCambios,
) -> Result<Json<MensajeResponse>, AppError> {
    let shown = id.map(|i| i.to_string()).unwrap_or_default();
    tracing::info!(version = version.label(), id = %shown, "updating cliente");
    if state.clientes.update(id, cambios).await? {
        Ok(Json(MensajeResponse::new(format!(
            "Cliente {} con ID {shown} actualizado exitosamente.",
            version.nombre()
        ))))
    } else {
        Err(AppError::not_found(format!(
            "Cliente {} con ID {shown} no encontrado.",
            version.nombre()
        )))
    }
}

async fn eliminar(
    state: &AppState,
    version: ApiVersion,
    raw_id: &str,
) -> Result<Json<MensajeResponse>, AppError> {
    tracing::info!(version = version.label(), id = %raw_id, "deleting cliente");
    if state.clientes.delete(parse_id(raw_id)).await? {
        Ok(Json(MensajeResponse::new(format!(
            "Cliente {} con ID {raw_id} eliminado exitosamente.",
            version.nombre()
        ))))
    } else {
        Err(AppError::not_found(format!(
            "Cliente {} con ID {raw_id} no encontrado.",
            version.nombre()
        )))
    }
}

// ── V1 ──────────────────────────────────────────────────────────────

/// GET /api/v1/cliente: One page of clientes.
#[utoipa::path(
    get,
    path = "/api/v1/cliente",
    params(ListarParams),
    responses(
        (status = 200, description = "Envelope with the page in `data`", body = [ClienteV1]),
        (status = 204, description = "No clientes on this page"),
    ),
    tag = "cliente-v1"
)]
pub(crate) async fn listar_v1(
    State(state): State<AppState>,
    params: Result<Query<ListarParams>, QueryRejection>,
) -> Result<DataResponse<ClienteV1>, AppError> {
    let clientes = state.clientes.list(paginacion(params)?).await?;
    Ok(envelope(&state, ApiVersion::V1, clientes))
}

/// GET /api/v1/cliente/{id}
#[utoipa::path(
    get,
    path = "/api/v1/cliente/{id}",
    params(("id" = i32, Path, description = "Cliente ID")),
    responses(
        (status = 200, description = "Envelope with one cliente", body = [ClienteV1]),
        (status = 204, description = "Not found"),
    ),
    tag = "cliente-v1"
)]
pub(crate) async fn obtener_v1(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<DataResponse<ClienteV1>, AppError> {
    let clientes = state.clientes.get_by_id(parse_id(&id)).await?;
    Ok(envelope(&state, ApiVersion::V1, clientes))
}

/// GET /api/v1/cliente/buscar: AND-combined substring search, max 10 rows.
#[utoipa::path(
    get,
    path = "/api/v1/cliente/buscar",
    params(BuscarParamsV1),
    responses(
        (status = 200, description = "Envelope with matches", body = [ClienteV1]),
        (status = 204, description = "No matches"),
    ),
    tag = "cliente-v1"
)]
pub(crate) async fn buscar_v1(
    State(state): State<AppState>,
    params: Result<Query<BuscarParamsV1>, QueryRejection>,
) -> Result<DataResponse<ClienteV1>, AppError> {
    let p = extract_query(params)?;
    let clientes = state
        .clientes
        .search(CriteriosBusqueda {
            nombre: p.nombre,
            apellido: p.apellido,
            email: p.email,
            telefono: p.telefono,
        })
        .await?;
    Ok(envelope(&state, ApiVersion::V1, clientes))
}

/// POST /api/v1/cliente: Create a batch.
#[utoipa::path(
    post,
    path = "/api/v1/cliente",
    request_body = [CrearClienteV1],
    responses(
        (status = 201, description = "Created", body = MensajeResponse),
        (status = 400, description = "Empty or invalid batch", body = crate::error::ErrorBody),
    ),
    tag = "cliente-v1"
)]
pub(crate) async fn crear_v1(
    State(state): State<AppState>,
    body: Result<Json<Vec<CrearClienteV1>>, JsonRejection>,
) -> Result<(StatusCode, Json<MensajeResponse>), AppError> {
    let req = extract_json(body)?;
    crear(&state, ApiVersion::V1, req.into_iter().map(NuevoCliente::from).collect()).await
}

/// PUT /api/v1/cliente: Replace every contact field.
#[utoipa::path(
    put,
    path = "/api/v1/cliente",
    request_body = ActualizarClienteV1,
    responses(
        (status = 200, description = "Updated", body = MensajeResponse),
        (status = 400, description = "Missing id or invalid fields", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "cliente-v1"
)]
pub(crate) async fn actualizar_v1(
    State(state): State<AppState>,
    body: Result<Json<ActualizarClienteV1>, JsonRejection>,
) -> Result<Json<MensajeResponse>, AppError> {
    let req = crate::extractors::extract_validated_json(body)?;
    let id = req.id;
    actualizar(&state, ApiVersion::V1, id, req.into_cambios()).await
}

/// DELETE /api/v1/cliente/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/cliente/{id}",
    params(("id" = i32, Path, description = "Cliente ID")),
    responses(
        (status = 200, description = "Deleted", body = MensajeResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "cliente-v1"
)]
pub(crate) async fn eliminar_v1(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MensajeResponse>, AppError> {
    eliminar(&state, ApiVersion::V1, &id).await
}

// ── V2 ──────────────────────────────────────────────────────────────

/// GET /api/v2/cliente: One page of clientes.
#[utoipa::path(
    get,
    path = "/api/v2/cliente",
    params(ListarParams),
    responses(
        (status = 200, description = "Envelope with the page in `data`", body = [ClienteV2]),
        (status = 204, description = "No clientes on this page"),
    ),
    tag = "cliente-v2"
)]
pub(crate) async fn listar_v2(
    State(state): State<AppState>,
    params: Result<Query<ListarParams>, QueryRejection>,
) -> Result<DataResponse<ClienteV2>, AppError> {
    let clientes = state.clientes.list(paginacion(params)?).await?;
    Ok(envelope(&state, ApiVersion::V2, clientes))
}

/// GET /api/v2/cliente/{id}
#[utoipa::path(
    get,
    path = "/api/v2/cliente/{id}",
    params(("id" = i32, Path, description = "Cliente ID")),
    responses(
        (status = 200, description = "Envelope with one cliente", body = [ClienteV2]),
        (status = 204, description = "Not found"),
    ),
    tag = "cliente-v2"
)]
pub(crate) async fn obtener_v2(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<DataResponse<ClienteV2>, AppError> {
    let clientes = state.clientes.get_by_id(parse_id(&id)).await?;
    Ok(envelope(&state, ApiVersion::V2, clientes))
}

/// GET /api/v2/cliente/buscar: Phone is not a V2 search field.
#[utoipa::path(
    get,
    path = "/api/v2/cliente/buscar",
    params(BuscarParamsV2),
    responses(
        (status = 200, description = "Envelope with matches", body = [ClienteV2]),
        (status = 204, description = "No matches"),
    ),
    tag = "cliente-v2"
)]
pub(crate) async fn buscar_v2(
    State(state): State<AppState>,
    params: Result<Query<BuscarParamsV2>, QueryRejection>,
) -> Result<DataResponse<ClienteV2>, AppError> {
    let p = extract_query(params)?;
    let clientes = state
        .clientes
        .search(CriteriosBusqueda {
            nombre: p.nombre,
            apellido: p.apellido,
            email: p.email,
            telefono: None,
        })
        .await?;
    Ok(envelope(&state, ApiVersion::V2, clientes))
}

/// POST /api/v2/cliente: Create a batch; phone is optional.
#[utoipa::path(
    post,
    path = "/api/v2/cliente",
    request_body = [CrearClienteV2],
    responses(
        (status = 201, description = "Created", body = MensajeResponse),
        (status = 400, description = "Empty or invalid batch", body = crate::error::ErrorBody),
    ),
    tag = "cliente-v2"
)]
pub(crate) async fn crear_v2(
    State(state): State<AppState>,
    body: Result<Json<Vec<CrearClienteV2>>, JsonRejection>,
) -> Result<(StatusCode, Json<MensajeResponse>), AppError> {
    let req = extract_json(body)?;
    crear(&state, ApiVersion::V2, req.into_iter().map(NuevoCliente::from).collect()).await
}

/// PUT /api/v2/cliente: Merge the supplied fields.
#[utoipa::path(
    put,
    path = "/api/v2/cliente",
    request_body = ActualizarClienteV2,
    responses(
        (status = 200, description = "Updated", body = MensajeResponse),
        (status = 400, description = "Missing id or invalid fields", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "cliente-v2"
)]
pub(crate) async fn actualizar_v2(
    State(state): State<AppState>,
    body: Result<Json<ActualizarClienteV2>, JsonRejection>,
) -> Result<Json<MensajeResponse>, AppError> {
    let req = crate::extractors::extract_validated_json(body)?;
    let id = req.id;
    actualizar(&state, ApiVersion::V2, id, req.into_cambios()).await
}

/// DELETE /api/v2/cliente/{id}
#[utoipa::path(
    delete,
    path = "/api/v2/cliente/{id}",
    params(("id" = i32, Path, description = "Cliente ID")),
    responses(
        (status = 200, description = "Deleted", body = MensajeResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "cliente-v2"
)]
pub(crate) async fn eliminar_v2(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MensajeResponse>, AppError> {
    eliminar(&state, ApiVersion::V2, &id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use arquetipo_core::TELEFONO_NO_DISPONIBLE;

    fn cliente(telefono: &str) -> Cliente {
        Cliente {
            id: 3,
            nombre: "Ana".into(),
            apellido: "Rojas".into(),
            email: "ana@correo.cl".into(),
            telefono: telefono.into(),
            estado_civil: Some("Soltera".into()),
            preferencia_contacto: None,
            fecha_registro: Utc::now(),
        }
    }

    #[test]
    fn v2_view_hides_phone_sentinel() {
        let json = serde_json::to_value(ClienteV2::from(cliente(TELEFONO_NO_DISPONIBLE))).unwrap();
        assert!(json.get("telefono").is_none());
        assert_eq!(json["estadoCivil"], "Soltera");
        assert!(json.get("preferenciaContacto").is_none());
        assert!(json.get("fechaRegistro").is_some());
    }

    #[test]
    fn v1_view_keeps_only_contact_fields() {
        let json = serde_json::to_value(ClienteV1::from(cliente("+569"))).unwrap();
        assert_eq!(json.as_object().map(|o| o.len()), Some(5));
        assert_eq!(json["telefono"], "+569");
    }

    #[test]
    fn requests_accept_pascal_case() {
        let req: CrearClienteV2 = serde_json::from_str(
            r#"{"Nombre":"Ana","Apellido":"Rojas","Email":"ana@correo.cl","PreferenciaContacto":"Email"}"#,
        )
        .unwrap();
        let nuevo = NuevoCliente::from(req);
        assert_eq!(nuevo.nombre, "Ana");
        assert_eq!(nuevo.telefono, TELEFONO_NO_DISPONIBLE);
        assert_eq!(nuevo.preferencia_contacto.as_deref(), Some("Email"));
    }

    #[test]
    fn update_without_id_is_invalid() {
        let req: ActualizarClienteV2 = serde_json::from_str(r#"{"nombre":"Ana"}"#).unwrap();
        assert!(matches!(req.validate(), Err(AppError::Validation(ref m)) if m == ID_REQUERIDO));
    }

    #[test]
    fn v2_update_blank_phone_becomes_sentinel() {
        let req: ActualizarClienteV2 =
            serde_json::from_str(r#"{"id":1,"telefono":"","nombre":""}"#).unwrap();
        let cambios = req.into_cambios();
        assert_eq!(cambios.telefono.as_deref(), Some(TELEFONO_NO_DISPONIBLE));
        assert_eq!(cambios.nombre, None);
    }

    #[test]
    fn path_ids() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("abc"), None);
    }
}
