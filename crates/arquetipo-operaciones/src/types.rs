//! Wire types for the Operaciones service.
//!
//! Fields use `#[serde(default)]` so that partially populated upstream
//! payloads still deserialize; unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// Status reported when a successful call carried no data.
pub const STATUS_SIN_DATOS: &str = "204";

/// Comment reported when a successful call carried no data.
pub const COMENTARIO_SIN_DATOS: &str = "Respuesta sin datos.";

/// Common envelope returned by every Operaciones endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperacionesResponse<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub comentario: Option<String>,
    #[serde(rename = "sessionId", default)]
    pub session_id: String,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> OperacionesResponse<T> {
    /// Synthesized result for a success without data. Upstream envelope
    /// fields are kept when they were present.
    pub fn sin_datos(status: Option<String>, comentario: Option<String>, session_id: Option<String>) -> Self {
        Self {
            status: Some(status.unwrap_or_else(|| STATUS_SIN_DATOS.to_string())),
            comentario: Some(comentario.unwrap_or_else(|| COMENTARIO_SIN_DATOS.to_string())),
            session_id: session_id.unwrap_or_default(),
            data: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Raw upstream envelope where `data` may be `null` or missing.
#[derive(Debug, Deserialize)]
pub(crate) struct RawResponse<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub comentario: Option<String>,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    pub data: Option<Vec<T>>,
}

impl<T> RawResponse<T> {
    /// Normalize: absent or empty `data` becomes the synthesized empty result.
    pub fn normalizar(self) -> (OperacionesResponse<T>, bool) {
        match self.data {
            Some(data) if !data.is_empty() => (
                OperacionesResponse {
                    status: self.status,
                    comentario: self.comentario,
                    session_id: self.session_id.unwrap_or_default(),
                    data,
                },
                false,
            ),
            _ => (
                OperacionesResponse::sin_datos(self.status, self.comentario, self.session_id),
                true,
            ),
        }
    }
}

/// One exchange-rate quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasaDeCambioItem {
    #[serde(default)]
    pub tasacambio: f64,
    #[serde(default)]
    pub fechacambio: Option<String>,
    #[serde(default)]
    pub par_cod_error: i32,
    #[serde(default)]
    pub par_msg_error: Option<String>,
}

/// One calendar day in a legal-holiday range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeriadoLegalItem {
    #[serde(default)]
    pub anio: i32,
    #[serde(default)]
    pub mes: u32,
    #[serde(default)]
    pub dia: u32,
    #[serde(rename = "diaSemana", default)]
    pub dia_semana: String,
    #[serde(rename = "esFeriado", default)]
    pub es_feriado: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_data_is_normalized() {
        let raw: RawResponse<TasaDeCambioItem> =
            serde_json::from_str(r#"{"status":"200","sessionId":"abc","data":null}"#).unwrap();
        let (resp, vacia) = raw.normalizar();
        assert!(vacia);
        assert_eq!(resp.status.as_deref(), Some("200"));
        assert_eq!(resp.comentario.as_deref(), Some(COMENTARIO_SIN_DATOS));
        assert_eq!(resp.session_id, "abc");
        assert!(resp.data.is_empty());
    }

    #[test]
    fn omitted_data_field_is_normalized() {
        let raw: RawResponse<TasaDeCambioItem> =
            serde_json::from_str(r#"{"status":"200","comentario":"Sin tasa","sessionId":"s-9"}"#).unwrap();
        assert!(raw.data.is_none());
        let (resp, vacia) = raw.normalizar();
        assert!(vacia);
        assert_eq!(resp.comentario.as_deref(), Some("Sin tasa"));
        assert_eq!(resp.session_id, "s-9");
    }

    #[test]
    fn missing_envelope_fields_get_defaults() {
        let raw: RawResponse<FeriadoLegalItem> = serde_json::from_str("{}").unwrap();
        let (resp, vacia) = raw.normalizar();
        assert!(vacia);
        assert_eq!(resp.status.as_deref(), Some(STATUS_SIN_DATOS));
        assert_eq!(resp.session_id, "");
    }

    #[test]
    fn holiday_item_field_names() {
        let item: FeriadoLegalItem = serde_json::from_str(
            r#"{"anio":2026,"mes":9,"dia":18,"diaSemana":"Viernes","esFeriado":"S"}"#,
        )
        .unwrap();
        assert_eq!(item.dia_semana, "Viernes");
        assert_eq!(item.es_feriado, "S");
        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["diaSemana"], "Viernes");
    }
}
