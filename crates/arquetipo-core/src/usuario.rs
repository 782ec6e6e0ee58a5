//! Authentication principal.

use serde::{Deserialize, Serialize};

use crate::error::{self, ValidationError};

const MIN_NOMBRE_USUARIO: usize = 3;
const MAX_NOMBRE_USUARIO: usize = 100;
const MIN_PASSWORD: usize = 6;

/// A registered user. `password_hash` is a PHC-format string; the plain
/// password never reaches this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usuario {
    pub id: i32,
    pub nombre_usuario: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Comma-separated role list as stored.
    pub roles: Option<String>,
    pub esta_activo: bool,
}

impl Usuario {
    /// Parsed role list.
    pub fn roles(&self) -> Vec<String> {
        parse_roles(self.roles.as_deref())
    }

    /// Canonical form of a username as stored and looked up.
    pub fn normalizar_nombre(nombre_usuario: &str) -> &str {
        nombre_usuario.trim()
    }

    /// Registration rules for the username and plain password. Length
    /// limits apply to the normalized username.
    pub fn validate_registro(nombre_usuario: &str, password: &str) -> Result<(), ValidationError> {
        let nombre_usuario = Self::normalizar_nombre(nombre_usuario);
        error::required("nombreUsuario", nombre_usuario)?;
        error::min_len("nombreUsuario", nombre_usuario, MIN_NOMBRE_USUARIO)?;
        error::max_len("nombreUsuario", nombre_usuario, MAX_NOMBRE_USUARIO)?;
        error::required("password", password)?;
        error::min_len("password", password, MIN_PASSWORD)?;
        Ok(())
    }
}

/// Split a comma-separated role string, trimming whitespace and dropping
/// empty entries.
pub fn parse_roles(raw: Option<&str>) -> Vec<String> {
    raw.map(|r| {
        r.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_trimmed_and_filtered() {
        assert_eq!(parse_roles(Some(" Admin , ,Lector,")), vec!["Admin", "Lector"]);
        assert!(parse_roles(Some("  ")).is_empty());
        assert!(parse_roles(None).is_empty());
    }

    #[test]
    fn registration_rules() {
        assert!(Usuario::validate_registro("ana", "secreto").is_ok());
        assert_eq!(
            Usuario::validate_registro("an", "secreto"),
            Err(ValidationError::TooShort { field: "nombreUsuario", min: 3 })
        );
        assert_eq!(
            Usuario::validate_registro("ana", "12345"),
            Err(ValidationError::TooShort { field: "password", min: 6 })
        );
        assert_eq!(
            Usuario::validate_registro("", "secreto"),
            Err(ValidationError::Required("nombreUsuario"))
        );
    }

    #[test]
    fn username_limits_use_normalized_name() {
        assert_eq!(Usuario::normalizar_nombre("  ana \t"), "ana");
        assert_eq!(
            Usuario::validate_registro("  an  ", "secreto"),
            Err(ValidationError::TooShort { field: "nombreUsuario", min: 3 })
        );
        let padded = format!("  {}  ", "a".repeat(100));
        assert!(Usuario::validate_registro(&padded, "secreto").is_ok());
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let u = Usuario {
            id: 1,
            nombre_usuario: "ana".into(),
            password_hash: "$argon2id$secret".into(),
            roles: Some("Admin".into()),
            esta_activo: true,
        };
        let json = serde_json::to_string(&u).unwrap();
        assert!(!json.contains("argon2id"));
        assert_eq!(u.roles(), vec!["Admin"]);
    }
}
