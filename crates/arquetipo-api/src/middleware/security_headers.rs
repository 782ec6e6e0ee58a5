//! Security response headers.
//!
//! Headers already set by a handler are left alone. HSTS is only sent when
//! the request arrived over HTTPS, either directly or behind a proxy that
//! sets `X-Forwarded-Proto`.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use crate::config::Environment;

const CSP_DEVELOPMENT: &str = "default-src 'self'; frame-ancestors 'none';";
const CSP_PRODUCTION: &str =
    "default-src 'none'; frame-ancestors 'none'; base-uri 'none'; form-action 'none';";
const HSTS: &str = "max-age=31536000; includeSubDomains";

const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
const X_POWERED_BY: HeaderName = HeaderName::from_static("x-powered-by");

fn is_https(request: &Request) -> bool {
    if request.uri().scheme_str() == Some("https") {
        return true;
    }
    request
        .headers()
        .get(&X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}

fn set_if_absent(headers: &mut HeaderMap, name: HeaderName, value: &'static str) {
    headers
        .entry(name)
        .or_insert_with(|| HeaderValue::from_static(value));
}

/// Mount with `axum::middleware::from_fn_with_state(environment, ...)`.
pub async fn security_headers_middleware(
    State(environment): State<Environment>,
    request: Request,
    next: Next,
) -> Response {
    let https = is_https(&request);
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    set_if_absent(headers, header::X_CONTENT_TYPE_OPTIONS, "nosniff");
    set_if_absent(headers, header::REFERRER_POLICY, "same-origin");
    set_if_absent(
        headers,
        header::CONTENT_SECURITY_POLICY,
        if environment.is_development() {
            CSP_DEVELOPMENT
        } else {
            CSP_PRODUCTION
        },
    );
    if https {
        set_if_absent(headers, header::STRICT_TRANSPORT_SECURITY, HSTS);
    }
    headers.remove(X_POWERED_BY);

    response
}
