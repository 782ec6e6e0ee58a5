//! # Response Envelope
//!
//! Every list-returning endpoint wraps its payload in the same header:
//!
//! ```json
//! {"version": "1.0", "status": 200, "hostName": "api-01", "codeVersion": "0.1.0", "data": [...]}
//! ```
//!
//! An empty `data` list is answered with `204 No Content` and no body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Crate version reported as `codeVersion`.
pub const CODE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// API version a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    pub fn label(&self) -> &'static str {
        match self {
            Self::V1 => "1.0",
            Self::V2 => "2.0",
        }
    }

    /// `V1` / `V2`, as used in user-facing messages.
    pub fn nombre(&self) -> &'static str {
        match self {
            Self::V1 => "V1",
            Self::V2 => "V2",
        }
    }
}

/// Header fields shared by every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Encabezado {
    pub version: String,
    pub status: u16,
    pub host_name: String,
    pub code_version: String,
}

impl Encabezado {
    pub fn new(version: ApiVersion, host_name: &str) -> Self {
        Self {
            version: version.label().to_string(),
            status: StatusCode::OK.as_u16(),
            host_name: host_name.to_string(),
            code_version: CODE_VERSION.to_string(),
        }
    }
}

/// `{...header, data: [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    #[serde(flatten)]
    pub encabezado: Encabezado,
    pub data: Vec<T>,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(version: ApiVersion, host_name: &str, data: Vec<T>) -> Self {
        Self {
            encabezado: Encabezado::new(version, host_name),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for DataResponse<T> {
    fn into_response(self) -> Response {
        if self.data.is_empty() {
            StatusCode::NO_CONTENT.into_response()
        } else {
            (StatusCode::OK, Json(self)).into_response()
        }
    }
}

/// `{message}` body returned by mutations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MensajeResponse {
    pub message: String,
}

impl MensajeResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
