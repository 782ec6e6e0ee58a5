//! Global exception handling.
//!
//! Two pieces produce the same 500 body:
//!
//! - [`catch_panic_layer`] turns a panicking handler into a response.
//! - [`internal_error_middleware`] picks up [`AppError::Internal`] responses
//!   through the [`InternalErrorDetail`] extension.
//!
//! Both log at `ERROR` with the request id. In development the body also
//! carries `details: {requestId, detail}`.
//!
//! [`AppError::Internal`]: crate::error::AppError::Internal

use std::any::Any;

use arquetipo_operaciones::current_request_id;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tower_http::catch_panic::{CatchPanicLayer, ResponseForPanic};

use crate::config::Environment;
use crate::error::{ErrorBody, ErrorDetail, InternalErrorDetail};

/// Message returned for every unhandled failure.
pub const MENSAJE_ERROR_INTERNO: &str = "Ocurrió un error interno al procesar la solicitud.";

fn internal_error_response(environment: Environment, request_id: &str, detail: &str) -> Response {
    let details = environment.is_development().then(|| {
        serde_json::json!({
            "requestId": request_id,
            "detail": detail,
        })
    });

    let body = ErrorBody {
        error: ErrorDetail {
            code: "INTERNAL_ERROR".to_string(),
            message: MENSAJE_ERROR_INTERNO.to_string(),
            details,
        },
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Builds the panic response. Runs inside the request-id scope, so the
/// task-local id is still readable here.
#[derive(Debug, Clone, Copy)]
pub struct PanicResponder {
    environment: Environment,
}

impl ResponseForPanic for PanicResponder {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
        let detail = if let Some(s) = err.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = err.downcast_ref::<&str>() {
            (*s).to_string()
        } else {
            "unknown panic payload".to_string()
        };
        let request_id = current_request_id().unwrap_or_default();

        tracing::error!(request_id = %request_id, panic = %detail, "unhandled panic while processing request");
        internal_error_response(self.environment, &request_id, &detail)
    }
}

pub fn catch_panic_layer(environment: Environment) -> CatchPanicLayer<PanicResponder> {
    CatchPanicLayer::custom(PanicResponder { environment })
}

/// Log `AppError::Internal` causes and, in development, expose them.
///
/// Mount with `axum::middleware::from_fn_with_state(environment, ...)`.
pub async fn internal_error_middleware(
    State(environment): State<Environment>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    let Some(InternalErrorDetail(cause)) = response.extensions().get::<InternalErrorDetail>().cloned()
    else {
        return response;
    };

    let request_id = current_request_id().unwrap_or_default();
    tracing::error!(request_id = %request_id, error = %cause, "request failed with an internal error");

    if environment.is_development() {
        internal_error_response(environment, &request_id, &cause)
    } else {
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn boom() -> &'static str {
        panic!("fallo inesperado")
    }

    async fn internal() -> Result<&'static str, AppError> {
        Err(AppError::Internal("pool timed out".into()))
    }

    fn test_app(environment: Environment) -> Router {
        Router::new()
            .route("/boom", get(boom))
            .route("/internal", get(internal))
            .route("/ok", get(|| async { "ok" }))
            .layer(from_fn_with_state(environment, internal_error_middleware))
            .layer(catch_panic_layer(environment))
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(
                axum::http::Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn panic_becomes_json_500_without_details_in_production() {
        let (status, body) = call(test_app(Environment::Production), "/boom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], MENSAJE_ERROR_INTERNO);
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn panic_details_in_development() {
        let (status, body) = call(test_app(Environment::Development), "/boom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["details"]["detail"], "fallo inesperado");
    }

    #[tokio::test]
    async fn internal_error_cause_only_in_development() {
        let (status, body) = call(test_app(Environment::Production), "/internal").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].get("details").is_none());
        assert!(!body.to_string().contains("pool timed out"));

        let (_, body) = call(test_app(Environment::Development), "/internal").await;
        assert_eq!(body["error"]["details"]["detail"], "pool timed out");
    }

    #[tokio::test]
    async fn successful_responses_pass_through() {
        let resp = test_app(Environment::Development)
            .oneshot(
                axum::http::Request::builder()
                    .uri("/ok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
