//! # Repository Layer
//!
//! Storage seams for the two aggregates. The service runs against
//! Postgres ([`crate::db`]) when `DATABASE_URL` is set and against the
//! in-memory tables in [`memory`] otherwise (development and tests).
//!
//! Mutations report existence through their return value (`Option` /
//! `bool`) from a single atomic operation, so callers never need a
//! separate existence check before updating or deleting.

pub mod memory;

use arquetipo_core::{Cliente, ClienteCambios, CriteriosBusqueda, NuevoCliente, Paginacion, Usuario};
use async_trait::async_trait;

pub use memory::{MemoryClienteRepository, MemoryUsuarioRepository};

/// Storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A unique constraint rejected the write. Carries a user-facing message.
    #[error("{0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ClienteRepository: Send + Sync {
    /// One page, ordered by id ascending.
    async fn list(&self, paginacion: Paginacion) -> Result<Vec<Cliente>, RepositoryError>;

    async fn get_by_id(&self, id: i32) -> Result<Option<Cliente>, RepositoryError>;

    /// At most `MAX_RESULTADOS_BUSQUEDA` rows, ordered by id ascending.
    async fn search(&self, criterios: &CriteriosBusqueda) -> Result<Vec<Cliente>, RepositoryError>;

    /// Insert all rows or none.
    async fn insert_batch(&self, clientes: Vec<NuevoCliente>) -> Result<Vec<Cliente>, RepositoryError>;

    /// Apply `cambios` to the row with `id`. `None` when it does not exist.
    async fn update(
        &self,
        id: i32,
        cambios: &ClienteCambios,
    ) -> Result<Option<Cliente>, RepositoryError>;

    /// `false` when no row had that id.
    async fn delete(&self, id: i32) -> Result<bool, RepositoryError>;
}

/// Input for registering a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NuevoUsuario {
    pub nombre_usuario: String,
    pub password_hash: String,
    pub roles: Option<String>,
}

#[async_trait]
pub trait UsuarioRepository: Send + Sync {
    async fn find_by_nombre(&self, nombre_usuario: &str) -> Result<Option<Usuario>, RepositoryError>;

    /// Fails with [`RepositoryError::Duplicate`] when the username is taken.
    async fn create(&self, nuevo: NuevoUsuario) -> Result<Usuario, RepositoryError>;

    /// Activate or deactivate a user. `false` when the user does not exist.
    async fn set_activo(&self, nombre_usuario: &str, activo: bool) -> Result<bool, RepositoryError>;
}

/// User-facing message for a taken username.
pub const NOMBRE_USUARIO_DUPLICADO: &str = "El nombre de usuario ya existe.";
