//! # arquetipo-core: Domain Types for the Arquetipo Service
//!
//! Pure domain layer shared by the HTTP service and its tests. Nothing in
//! this crate performs I/O.
//!
//! ## Contents
//!
//! - [`Cliente`]: the customer aggregate, plus the inputs that create
//!   ([`NuevoCliente`]) and mutate ([`ClienteCambios`]) it.
//! - [`CriteriosBusqueda`]: field-wise search filter with the 10-row cap.
//! - [`Paginacion`]: page/page-size pair with clamping to defaults.
//! - [`Usuario`]: authentication principal and role parsing.
//! - [`ValidationError`]: every rule violation a request can trigger.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `arquetipo-*` crates.
//! - No `.unwrap()` outside tests.

pub mod cliente;
pub mod error;
pub mod paginacion;
pub mod usuario;

pub use cliente::{
    Cliente, ClienteCambios, CriteriosBusqueda, NuevoCliente, MAX_RESULTADOS_BUSQUEDA,
    TELEFONO_NO_DISPONIBLE,
};
pub use error::ValidationError;
pub use paginacion::Paginacion;
pub use usuario::{parse_roles, Usuario};
