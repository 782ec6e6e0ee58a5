//! # Validation Errors
//!
//! Rule violations detected before a request reaches storage. Messages are
//! user-facing (Spanish, matching the rest of the API surface).

use thiserror::Error;

/// A request field or batch failed a business rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("El campo '{0}' es requerido.")]
    Required(&'static str),

    /// A field exceeds its maximum length (in characters).
    #[error("El campo '{field}' no puede superar {max} caracteres.")]
    TooLong {
        field: &'static str,
        max: usize,
    },

    /// A field is shorter than its minimum length (in characters).
    #[error("El campo '{field}' debe tener al menos {min} caracteres.")]
    TooShort {
        field: &'static str,
        min: usize,
    },

    /// The email does not have a `local@domain.tld` shape.
    #[error("El email \"{0}\" no tiene un formato válido.")]
    InvalidEmail(String),

    /// A batch insert was submitted with no entries.
    #[error("La lista de clientes no puede estar vacía.")]
    EmptyBatch,
}

/// Reject blank values for a required field.
pub(crate) fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

/// Enforce an upper bound on character count.
pub(crate) fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        Err(ValidationError::TooLong { field, max })
    } else {
        Ok(())
    }
}

/// Enforce a lower bound on character count.
pub(crate) fn min_len(field: &'static str, value: &str, min: usize) -> Result<(), ValidationError> {
    if value.chars().count() < min {
        Err(ValidationError::TooShort { field, min })
    } else {
        Ok(())
    }
}

/// Loose structural email check: one `@`, non-empty local part, dotted
/// domain without leading/trailing dots, no whitespace.
pub(crate) fn email(value: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEmail(value.to_string());
    if value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}
