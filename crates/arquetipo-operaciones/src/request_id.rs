//! Request-scoped correlation id for outbound calls.
//!
//! The HTTP layer scopes the inbound `X-Request-ID` around each request;
//! [`crate::OperacionesClient`] reads it back and forwards it.

use std::future::Future;

/// Header carrying the correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Scope a request id for the lifetime of the provided future.
pub async fn with_request_id<F, T>(id: String, fut: F) -> T
where
    F: Future<Output = T>,
{
    REQUEST_ID.scope(id, fut).await
}

/// The request id scoped for the current task, if any.
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scoped_value_is_visible_inside_only() {
        assert_eq!(current_request_id(), None);
        let seen = with_request_id("abc-123".into(), async { current_request_id() }).await;
        assert_eq!(seen.as_deref(), Some("abc-123"));
        assert_eq!(current_request_id(), None);
    }
}
