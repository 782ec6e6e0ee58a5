//! # Operaciones lookups
//!
//! Exchange rates and legal holidays proxied from the Operaciones service,
//! under both API versions. Upstream HTTP errors keep their status code;
//! transport and decoding failures become 500.

use arquetipo_operaciones::{FeriadoLegalItem, OperacionesClient, OperacionesResponse, TasaDeCambioItem};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;
use crate::extractors::extract_query;
use crate::state::AppState;

const MONEDA_POR_DEFECTO: &str = "UF";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TasaDeCambioParams {
    /// `dd-MM-yyyy`
    pub fecha: Option<String>,
    /// Currency code, `UF` when omitted.
    pub moneda: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeriadosParams {
    /// `yyyy-MM-dd`
    #[serde(rename = "fechaInicioStr")]
    pub fecha_inicio: Option<String>,
    /// `yyyy-MM-dd`
    #[serde(rename = "fechaFinStr")]
    pub fecha_fin: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/Util/tasa-de-cambio", get(tasa_de_cambio))
        .route("/api/v2/Util/tasa-de-cambio", get(tasa_de_cambio))
        .route("/api/v1/Util/feriados-legales", get(feriados_legales))
        .route("/api/v2/Util/feriados-legales", get(feriados_legales))
}

fn client(state: &AppState) -> Result<&OperacionesClient, AppError> {
    state
        .operaciones
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("El servicio de Operaciones no está configurado."))
}

fn upstream(err: arquetipo_operaciones::OperacionesError, servicio: &str) -> AppError {
    tracing::error!(error = %err, upstream_status = ?err.status(), "Operaciones call failed");
    AppError::Upstream {
        status: err.status(),
        message: format!("Error al comunicarse con el servicio de {servicio}: {err}"),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// GET /api/v{1,2}/Util/tasa-de-cambio
#[utoipa::path(
    get,
    path = "/api/v1/Util/tasa-de-cambio",
    params(TasaDeCambioParams),
    responses(
        (status = 200, description = "Upstream response with at least one quote"),
        (status = 400, description = "Missing or malformed date", body = crate::error::ErrorBody),
        (status = 404, description = "No quote for that date and currency", body = crate::error::ErrorBody),
        (status = 503, description = "Operaciones not configured", body = crate::error::ErrorBody),
    ),
    tag = "util"
)]
pub(crate) async fn tasa_de_cambio(
    State(state): State<AppState>,
    params: Result<Query<TasaDeCambioParams>, QueryRejection>,
) -> Result<Json<OperacionesResponse<TasaDeCambioItem>>, AppError> {
    let p = extract_query(params)?;
    let fecha = non_blank(p.fecha);
    let moneda = match p.moneda {
        None => Some(MONEDA_POR_DEFECTO.to_string()),
        explicit => non_blank(explicit),
    };
    let (Some(fecha), Some(moneda)) = (fecha, moneda) else {
        return Err(AppError::Validation(
            "Los parámetros 'fecha' y 'moneda' son requeridos.".into(),
        ));
    };
    let fecha = NaiveDate::parse_from_str(&fecha, "%d-%m-%Y").map_err(|_| {
        AppError::Validation("Formato de fecha inválido. Use dd-MM-yyyy.".into())
    })?;

    let client = client(&state)?;
    tracing::info!(%fecha, %moneda, "requesting exchange rate");
    let resultado = client
        .tasa_de_cambio(fecha, &moneda)
        .await
        .map_err(|e| upstream(e, "tasas"))?;

    if resultado.is_empty() {
        tracing::warn!(status = ?resultado.status, comentario = ?resultado.comentario, "exchange rate response has no data");
        return Err(AppError::not_found(resultado.comentario.unwrap_or_else(|| {
            "No se encontró la tasa de cambio para los parámetros especificados.".into()
        })));
    }
    Ok(Json(resultado))
}

/// GET /api/v{1,2}/Util/feriados-legales
#[utoipa::path(
    get,
    path = "/api/v1/Util/feriados-legales",
    params(FeriadosParams),
    responses(
        (status = 200, description = "Upstream response, possibly with empty data"),
        (status = 400, description = "Missing, malformed or inverted range", body = crate::error::ErrorBody),
        (status = 503, description = "Operaciones not configured", body = crate::error::ErrorBody),
    ),
    tag = "util"
)]
pub(crate) async fn feriados_legales(
    State(state): State<AppState>,
    params: Result<Query<FeriadosParams>, QueryRejection>,
) -> Result<Json<OperacionesResponse<FeriadoLegalItem>>, AppError> {
    let p = extract_query(params)?;
    let (Some(inicio), Some(fin)) = (non_blank(p.fecha_inicio), non_blank(p.fecha_fin)) else {
        return Err(AppError::Validation(
            "Los parámetros 'fechaInicioStr' y 'fechaFinStr' son requeridos.".into(),
        ));
    };
    let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d");
    let (Ok(inicio), Ok(fin)) = (parse(inicio.as_str()), parse(fin.as_str())) else {
        return Err(AppError::Validation(
            "Formato de fecha inválido para fechaInicioStr o fechaFinStr. Use yyyy-MM-dd.".into(),
        ));
    };
    if fin < inicio {
        return Err(AppError::Validation(
            "La fecha de fin no puede ser anterior a la fecha de inicio.".into(),
        ));
    }

    let client = client(&state)?;
    tracing::info!(%inicio, %fin, "requesting legal holidays");
    let resultado = client
        .feriados_legales(inicio, fin)
        .await
        .map_err(|e| upstream(e, "feriados"))?;

    tracing::info!(comentario = ?resultado.comentario, dias = resultado.data.len(), "legal holidays fetched");
    Ok(Json(resultado))
}
