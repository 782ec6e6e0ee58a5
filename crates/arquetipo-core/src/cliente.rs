//! # Cliente Aggregate
//!
//! One canonical customer entity. API versions project it into their own
//! response shapes; they never own separate storage models.
//!
//! Mutations come in two flavours, both expressed as [`ClienteCambios`]:
//!
//! - **Replacement** (`ClienteCambios::reemplazo`): every contact field is
//!   overwritten.
//! - **Merge** (`ClienteCambios::parcial`): only non-blank fields are
//!   applied. A blank phone is the one exception: it is stored as
//!   [`TELEFONO_NO_DISPONIBLE`] instead of being ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{self, ValidationError};

/// Stored in place of a phone number the customer did not provide.
pub const TELEFONO_NO_DISPONIBLE: &str = "N/A";

/// Upper bound on rows returned by a field search.
pub const MAX_RESULTADOS_BUSQUEDA: i64 = 10;

const MAX_NOMBRE: usize = 100;
const MAX_EMAIL: usize = 100;
const MAX_TELEFONO: usize = 20;
const MAX_ATRIBUTO_V2: usize = 50;

/// A stored customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cliente {
    pub id: i32,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub telefono: String,
    pub estado_civil: Option<String>,
    pub preferencia_contacto: Option<String>,
    pub fecha_registro: DateTime<Utc>,
}

impl Cliente {
    /// The phone number, or `None` when the sentinel is stored.
    pub fn telefono_disponible(&self) -> Option<&str> {
        if self.telefono == TELEFONO_NO_DISPONIBLE {
            None
        } else {
            Some(&self.telefono)
        }
    }
}

/// Input for a single insert. The store assigns `id` and `fecha_registro`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NuevoCliente {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub telefono: String,
    pub estado_civil: Option<String>,
    pub preferencia_contacto: Option<String>,
}

impl NuevoCliente {
    /// Build an insert from the four contact fields.
    pub fn new(
        nombre: impl Into<String>,
        apellido: impl Into<String>,
        email: impl Into<String>,
        telefono: impl Into<String>,
    ) -> Self {
        Self {
            nombre: nombre.into(),
            apellido: apellido.into(),
            email: email.into(),
            telefono: telefono.into(),
            estado_civil: None,
            preferencia_contacto: None,
        }
    }

    /// Same as [`NuevoCliente::new`] but an absent or blank phone becomes
    /// [`TELEFONO_NO_DISPONIBLE`].
    pub fn con_telefono_opcional(
        nombre: impl Into<String>,
        apellido: impl Into<String>,
        email: impl Into<String>,
        telefono: Option<String>,
    ) -> Self {
        let telefono = match telefono {
            Some(t) if !t.trim().is_empty() => t,
            _ => TELEFONO_NO_DISPONIBLE.to_string(),
        };
        Self::new(nombre, apellido, email, telefono)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        error::required("nombre", &self.nombre)?;
        error::max_len("nombre", &self.nombre, MAX_NOMBRE)?;
        error::required("apellido", &self.apellido)?;
        error::max_len("apellido", &self.apellido, MAX_NOMBRE)?;
        error::required("email", &self.email)?;
        error::max_len("email", &self.email, MAX_EMAIL)?;
        error::email(&self.email)?;
        error::required("telefono", &self.telefono)?;
        error::max_len("telefono", &self.telefono, MAX_TELEFONO)?;
        if let Some(v) = &self.estado_civil {
            error::max_len("estadoCivil", v, MAX_ATRIBUTO_V2)?;
        }
        if let Some(v) = &self.preferencia_contacto {
            error::max_len("preferenciaContacto", v, MAX_ATRIBUTO_V2)?;
        }
        Ok(())
    }

    /// Materialize the stored record.
    pub fn into_cliente(self, id: i32, fecha_registro: DateTime<Utc>) -> Cliente {
        Cliente {
            id,
            nombre: self.nombre,
            apellido: self.apellido,
            email: self.email,
            telefono: self.telefono,
            estado_civil: self.estado_civil,
            preferencia_contacto: self.preferencia_contacto,
            fecha_registro,
        }
    }

    /// Validate a whole batch. An empty batch is rejected outright.
    pub fn validate_batch(batch: &[NuevoCliente]) -> Result<(), ValidationError> {
        if batch.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        batch.iter().try_for_each(NuevoCliente::validate)
    }
}

/// Field-level changes for an existing customer. `None` leaves the stored
/// value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClienteCambios {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub estado_civil: Option<String>,
    pub preferencia_contacto: Option<String>,
}

impl ClienteCambios {
    /// Overwrite every contact field.
    pub fn reemplazo(
        nombre: impl Into<String>,
        apellido: impl Into<String>,
        email: impl Into<String>,
        telefono: impl Into<String>,
    ) -> Self {
        Self {
            nombre: Some(nombre.into()),
            apellido: Some(apellido.into()),
            email: Some(email.into()),
            telefono: Some(telefono.into()),
            estado_civil: None,
            preferencia_contacto: None,
        }
    }

    /// Merge-patch: blank strings mean "no change", except a present but
    /// blank phone, which is stored as [`TELEFONO_NO_DISPONIBLE`].
    pub fn parcial(
        nombre: Option<String>,
        apellido: Option<String>,
        email: Option<String>,
        telefono: Option<String>,
        estado_civil: Option<String>,
        preferencia_contacto: Option<String>,
    ) -> Self {
        let telefono = telefono.map(|t| {
            if t.trim().is_empty() {
                TELEFONO_NO_DISPONIBLE.to_string()
            } else {
                t
            }
        });
        Self {
            nombre: non_blank(nombre),
            apellido: non_blank(apellido),
            email: non_blank(email),
            telefono,
            estado_civil: non_blank(estado_civil),
            preferencia_contacto: non_blank(preferencia_contacto),
        }
    }

    /// True when applying these changes would not modify anything.
    pub fn is_empty(&self) -> bool {
        self.nombre.is_none()
            && self.apellido.is_none()
            && self.email.is_none()
            && self.telefono.is_none()
            && self.estado_civil.is_none()
            && self.preferencia_contacto.is_none()
    }

    /// Check the fields that are present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(v) = &self.nombre {
            error::required("nombre", v)?;
            error::max_len("nombre", v, MAX_NOMBRE)?;
        }
        if let Some(v) = &self.apellido {
            error::required("apellido", v)?;
            error::max_len("apellido", v, MAX_NOMBRE)?;
        }
        if let Some(v) = &self.email {
            error::required("email", v)?;
            error::max_len("email", v, MAX_EMAIL)?;
            error::email(v)?;
        }
        if let Some(v) = &self.telefono {
            error::required("telefono", v)?;
            error::max_len("telefono", v, MAX_TELEFONO)?;
        }
        if let Some(v) = &self.estado_civil {
            error::max_len("estadoCivil", v, MAX_ATRIBUTO_V2)?;
        }
        if let Some(v) = &self.preferencia_contacto {
            error::max_len("preferenciaContacto", v, MAX_ATRIBUTO_V2)?;
        }
        Ok(())
    }

    /// Apply the present fields to `cliente`.
    pub fn aplicar(&self, cliente: &mut Cliente) {
        if let Some(v) = &self.nombre {
            cliente.nombre.clone_from(v);
        }
        if let Some(v) = &self.apellido {
            cliente.apellido.clone_from(v);
        }
        if let Some(v) = &self.email {
            cliente.email.clone_from(v);
        }
        if let Some(v) = &self.telefono {
            cliente.telefono.clone_from(v);
        }
        if let Some(v) = &self.estado_civil {
            cliente.estado_civil = Some(v.clone());
        }
        if let Some(v) = &self.preferencia_contacto {
            cliente.preferencia_contacto = Some(v.clone());
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Search filter. Blank fields are ignored; supplied fields must all match
/// (case-insensitive substring).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriosBusqueda {
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
}

impl CriteriosBusqueda {
    /// Trim every field and drop the blank ones.
    pub fn normalizado(self) -> Self {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        Self {
            nombre: clean(self.nombre),
            apellido: clean(self.apellido),
            email: clean(self.email),
            telefono: clean(self.telefono),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nombre.is_none()
            && self.apellido.is_none()
            && self.email.is_none()
            && self.telefono.is_none()
    }

    /// Whether `cliente` satisfies every supplied criterion.
    pub fn coincide(&self, cliente: &Cliente) -> bool {
        contiene(&cliente.nombre, self.nombre.as_deref())
            && contiene(&cliente.apellido, self.apellido.as_deref())
            && contiene(&cliente.email, self.email.as_deref())
            && contiene(&cliente.telefono, self.telefono.as_deref())
    }
}

fn contiene(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cliente() -> Cliente {
        NuevoCliente::new("Ana", "Pérez", "ana.perez@test.com", "912345678")
            .into_cliente(1, Utc::now())
    }

    #[test]
    fn optional_phone_falls_back_to_sentinel() {
        let n = NuevoCliente::con_telefono_opcional("Ana", "Pérez", "a@b.cl", None);
        assert_eq!(n.telefono, TELEFONO_NO_DISPONIBLE);
        let n = NuevoCliente::con_telefono_opcional("Ana", "Pérez", "a@b.cl", Some("  ".into()));
        assert_eq!(n.telefono, TELEFONO_NO_DISPONIBLE);
        let n = NuevoCliente::con_telefono_opcional("Ana", "Pérez", "a@b.cl", Some("123".into()));
        assert_eq!(n.telefono, "123");
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let mut n = NuevoCliente::new("", "Pérez", "a@b.cl", "1");
        assert_eq!(n.validate(), Err(ValidationError::Required("nombre")));
        n.nombre = "Ana".into();
        n.email = "no-es-email".into();
        assert!(matches!(n.validate(), Err(ValidationError::InvalidEmail(_))));
        n.email = "a@b.cl".into();
        n.telefono = "1".repeat(21);
        assert!(matches!(n.validate(), Err(ValidationError::TooLong { field: "telefono", .. })));
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert_eq!(NuevoCliente::validate_batch(&[]), Err(ValidationError::EmptyBatch));
    }

    #[test]
    fn batch_fails_on_first_invalid_entry() {
        let batch = vec![
            NuevoCliente::new("Ana", "Pérez", "a@b.cl", "1"),
            NuevoCliente::new("Beto", "", "b@b.cl", "2"),
        ];
        assert_eq!(
            NuevoCliente::validate_batch(&batch),
            Err(ValidationError::Required("apellido"))
        );
    }

    #[test]
    fn replacement_overwrites_contact_fields_only() {
        let mut c = cliente();
        c.estado_civil = Some("Soltera".into());
        ClienteCambios::reemplazo("Ana María", "Soto", "ams@test.com", "999").aplicar(&mut c);
        assert_eq!(c.nombre, "Ana María");
        assert_eq!(c.apellido, "Soto");
        assert_eq!(c.email, "ams@test.com");
        assert_eq!(c.telefono, "999");
        assert_eq!(c.estado_civil.as_deref(), Some("Soltera"));
    }

    #[test]
    fn merge_skips_blank_fields() {
        let mut c = cliente();
        let cambios = ClienteCambios::parcial(
            Some("".into()),
            None,
            Some("nuevo@test.com".into()),
            None,
            Some("Casada".into()),
            Some(" ".into()),
        );
        cambios.aplicar(&mut c);
        assert_eq!(c.nombre, "Ana");
        assert_eq!(c.apellido, "Pérez");
        assert_eq!(c.email, "nuevo@test.com");
        assert_eq!(c.telefono, "912345678");
        assert_eq!(c.estado_civil.as_deref(), Some("Casada"));
        assert_eq!(c.preferencia_contacto, None);
    }

    #[test]
    fn merge_maps_blank_phone_to_sentinel() {
        let mut c = cliente();
        let cambios = ClienteCambios::parcial(None, None, None, Some(String::new()), None, None);
        assert!(!cambios.is_empty());
        cambios.aplicar(&mut c);
        assert_eq!(c.telefono, TELEFONO_NO_DISPONIBLE);
        assert_eq!(c.telefono_disponible(), None);
    }

    #[test]
    fn merge_with_nothing_is_empty() {
        let cambios = ClienteCambios::parcial(None, Some("".into()), None, None, None, None);
        assert!(cambios.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let c = cliente();
        let criterios = CriteriosBusqueda {
            nombre: Some("aN".into()),
            email: Some("PEREZ@".into()),
            ..Default::default()
        };
        assert!(criterios.coincide(&c));
        let criterios = CriteriosBusqueda {
            apellido: Some("Rojas".into()),
            ..Default::default()
        };
        assert!(!criterios.coincide(&c));
    }

    #[test]
    fn search_normalization_drops_blanks() {
        let criterios = CriteriosBusqueda {
            nombre: Some("  ".into()),
            apellido: Some(" Rojas ".into()),
            email: None,
            telefono: Some(String::new()),
        }
        .normalizado();
        assert_eq!(criterios.nombre, None);
        assert_eq!(criterios.apellido.as_deref(), Some("Rojas"));
        assert_eq!(criterios.telefono, None);
        assert!(!criterios.is_empty());
        assert!(CriteriosBusqueda::default().normalizado().is_empty());
    }
}
