//! Request correlation id.
//!
//! Reuses a non-empty inbound `X-Request-ID` or generates a UUID v4. The id
//! is stored as [`RequestId`] in request extensions, scoped as the task-local
//! that the Operaciones client forwards, recorded on a `request` span and
//! echoed on the response.

use arquetipo_operaciones::with_request_id;
use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Correlation id of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestId(id.clone()));

    let span = tracing::info_span!("request", request_id = %id);
    let mut response = with_request_id(id.clone(), next.run(request))
        .instrument(span)
        .await;

    if !response.headers().contains_key(&X_REQUEST_ID) {
        match HeaderValue::from_str(&id) {
            Ok(value) => {
                response.headers_mut().insert(X_REQUEST_ID, value);
            }
            Err(_) => tracing::warn!("request id is not a valid header value; not echoed"),
        }
    }
    response
}
