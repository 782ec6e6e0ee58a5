//! Usuario persistence operations on the `usuarios` table.

use arquetipo_core::Usuario;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::repository::{NuevoUsuario, RepositoryError, UsuarioRepository, NOMBRE_USUARIO_DUPLICADO};

/// Postgres-backed [`UsuarioRepository`].
#[derive(Debug, Clone)]
pub struct PgUsuarioRepository {
    pool: PgPool,
}

impl PgUsuarioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsuarioRepository for PgUsuarioRepository {
    async fn find_by_nombre(&self, nombre_usuario: &str) -> Result<Option<Usuario>, RepositoryError> {
        let row = sqlx::query_as::<_, UsuarioRow>(
            "SELECT id, nombre_usuario, password_hash, roles, esta_activo
             FROM usuarios WHERE nombre_usuario = $1",
        )
        .bind(nombre_usuario)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UsuarioRow::into_record))
    }

    async fn create(&self, nuevo: NuevoUsuario) -> Result<Usuario, RepositoryError> {
        let row = sqlx::query_as::<_, UsuarioRow>(
            "INSERT INTO usuarios (nombre_usuario, password_hash, roles, esta_activo)
             VALUES ($1, $2, $3, TRUE)
             RETURNING id, nombre_usuario, password_hash, roles, esta_activo",
        )
        .bind(&nuevo.nombre_usuario)
        .bind(&nuevo.password_hash)
        .bind(nuevo.roles.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(NOMBRE_USUARIO_DUPLICADO.to_string())
            }
            other => RepositoryError::Database(other),
        })?;

        Ok(row.into_record())
    }

    async fn set_activo(&self, nombre_usuario: &str, activo: bool) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE usuarios SET esta_activo = $2 WHERE nombre_usuario = $1")
            .bind(nombre_usuario)
            .bind(activo)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct UsuarioRow {
    id: i32,
    nombre_usuario: String,
    password_hash: String,
    roles: Option<String>,
    esta_activo: bool,
}

impl UsuarioRow {
    fn into_record(self) -> Usuario {
        Usuario {
            id: self.id,
            nombre_usuario: self.nombre_usuario,
            password_hash: self.password_hash,
            roles: self.roles,
            esta_activo: self.esta_activo,
        }
    }
}
