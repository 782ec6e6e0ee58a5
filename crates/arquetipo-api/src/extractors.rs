//! # Custom Extractors & Validation
//!
//! Provides the [`Validate`] trait for request DTOs and helpers to extract
//! and validate JSON bodies and query strings in handlers.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;

use crate::error::AppError;

/// Trait for request types that can validate their business rules
/// beyond what serde deserialization checks.
pub trait Validate {
    fn validate(&self) -> Result<(), AppError>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), AppError> {
        self.iter().try_for_each(Validate::validate)
    }
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate()?;
    Ok(value)
}

/// Extract a query string, mapping parse errors to [`AppError::BadRequest`].
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct AlwaysOk;
    impl Validate for AlwaysOk {
        fn validate(&self) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[derive(Debug)]
    struct AlwaysFails;
    impl Validate for AlwaysFails {
        fn validate(&self) -> Result<(), AppError> {
            Err(AppError::Validation("nope".into()))
        }
    }

    #[test]
    fn extract_validated_json_passes_valid_body() {
        assert!(extract_validated_json(Ok(Json(AlwaysOk))).is_ok());
    }

    #[test]
    fn extract_validated_json_maps_rule_failure() {
        let err = extract_validated_json(Ok(Json(AlwaysFails))).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "nope"));
    }

    #[test]
    fn vec_validation_checks_every_element() {
        assert!(vec![AlwaysOk, AlwaysOk].validate().is_ok());
        assert!(vec![AlwaysFails].validate().is_err());
    }
}
