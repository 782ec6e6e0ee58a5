//! # arquetipo-operaciones: Typed client for the Operaciones service
//!
//! Two read-only calls against the Operaciones HTTP API:
//!
//! | Method | Path (relative to base URL) | Operation |
//! |--------|-----------------------------|-----------|
//! | GET | `service/generales/gettasadecambio/` | [`OperacionesClient::tasa_de_cambio`] |
//! | GET | `service/generales/getferiadoslegales/` | [`OperacionesClient::feriados_legales`] |
//!
//! Query parameters travel in request headers, not in the query string.
//! Requests use HTTP Basic credentials when configured and forward the
//! current [`request_id`] as `X-Request-ID`.
//!
//! Failure handling is propagate-and-translate only: no retries and no
//! timeout beyond the `reqwest` default. A successful response without
//! `data` is normalized into an empty [`OperacionesResponse`] instead of
//! an error.

pub mod config;
pub mod error;
pub mod request_id;
pub mod types;

pub use config::{ConfigError, OperacionesConfig};
pub use error::OperacionesError;
pub use request_id::{current_request_id, with_request_id, REQUEST_ID_HEADER};
pub use types::{FeriadoLegalItem, OperacionesResponse, TasaDeCambioItem};

use chrono::{Datelike, NaiveDate};
use serde::de::DeserializeOwned;

use crate::types::RawResponse;

const TASA_DE_CAMBIO_PATH: &str = "service/generales/gettasadecambio/";
const FERIADOS_LEGALES_PATH: &str = "service/generales/getferiadoslegales/";

/// Client for the Operaciones service. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct OperacionesClient {
    http: reqwest::Client,
    config: OperacionesConfig,
}

impl OperacionesClient {
    /// Create a new client from configuration.
    pub fn new(config: OperacionesConfig) -> Result<Self, OperacionesError> {
        let http = reqwest::Client::builder()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(|e| OperacionesError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self { http, config })
    }

    /// Base URL this client targets.
    pub fn base_url(&self) -> &url::Url {
        &self.config.base_url
    }

    /// Exchange rate for `moneda` on `fecha`.
    ///
    /// Sends `FECHACONSULTA` (`dd-MM-yyyy`) and `CODIGOMONEDA` headers.
    pub async fn tasa_de_cambio(
        &self,
        fecha: NaiveDate,
        moneda: &str,
    ) -> Result<OperacionesResponse<TasaDeCambioItem>, OperacionesError> {
        let headers = [
            ("FECHACONSULTA", fecha.format("%d-%m-%Y").to_string()),
            ("CODIGOMONEDA", moneda.to_string()),
        ];
        self.get(TASA_DE_CAMBIO_PATH, &headers).await
    }

    /// Legal holidays between `inicio` and `fin` (inclusive).
    ///
    /// Each date is split into year / two-digit month / two-digit day headers.
    pub async fn feriados_legales(
        &self,
        inicio: NaiveDate,
        fin: NaiveDate,
    ) -> Result<OperacionesResponse<FeriadoLegalItem>, OperacionesError> {
        let headers = [
            ("FechaInicioAnio", inicio.year().to_string()),
            ("FechaInicioMes", format!("{:02}", inicio.month())),
            ("FechaInicioDia", format!("{:02}", inicio.day())),
            ("FechaFinAnio", fin.year().to_string()),
            ("FechaFinMes", format!("{:02}", fin.month())),
            ("FechaFinDia", format!("{:02}", fin.day())),
        ];
        self.get(FERIADOS_LEGALES_PATH, &headers).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &'static str,
        headers: &[(&'static str, String)],
    ) -> Result<OperacionesResponse<T>, OperacionesError> {
        let endpoint = format!("GET {path}");
        let url = self.config.base_url.join(path).map_err(|e| {
            OperacionesError::Config(ConfigError::InvalidUrl(path.to_string(), e.to_string()))
        })?;

        tracing::info!(endpoint = %endpoint, "calling Operaciones");

        let mut request = self.http.get(url);
        if let Some((usuario, password)) = self.config.basic_credentials() {
            request = request.basic_auth(usuario, Some(password));
        }
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        if let Some(id) = current_request_id() {
            request = request.header(REQUEST_ID_HEADER, id);
        }

        let resp = request.send().await.map_err(|e| OperacionesError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(endpoint = %endpoint, status, body = %body, "Operaciones returned an error");
            return Err(OperacionesError::Api {
                endpoint,
                status,
                body,
            });
        }

        let bytes = resp.bytes().await.map_err(|e| OperacionesError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        let raw: RawResponse<T> = if bytes.iter().all(u8::is_ascii_whitespace) {
            RawResponse {
                status: None,
                comentario: None,
                session_id: None,
                data: None,
            }
        } else {
            serde_json::from_slice(&bytes).map_err(|e| OperacionesError::Deserialization {
                endpoint: endpoint.clone(),
                source: e,
            })?
        };

        let (response, vacia) = raw.normalizar();
        if vacia {
            tracing::warn!(endpoint = %endpoint, "Operaciones returned success without data");
        }
        Ok(response)
    }
}
