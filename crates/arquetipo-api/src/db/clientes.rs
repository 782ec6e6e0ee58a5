//! Cliente persistence operations on the `clientes` table.
//!
//! Update and delete are single statements; the affected row count is the
//! existence check.

use arquetipo_core::{
    Cliente, ClienteCambios, CriteriosBusqueda, NuevoCliente, Paginacion, MAX_RESULTADOS_BUSQUEDA,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::repository::{ClienteRepository, RepositoryError};

const COLUMNS: &str =
    "id, nombre, apellido, email, telefono, estado_civil, preferencia_contacto, fecha_registro";

/// Postgres-backed [`ClienteRepository`].
#[derive(Debug, Clone)]
pub struct PgClienteRepository {
    pool: PgPool,
}

impl PgClienteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClienteRepository for PgClienteRepository {
    async fn list(&self, paginacion: Paginacion) -> Result<Vec<Cliente>, RepositoryError> {
        let rows = sqlx::query_as::<_, ClienteRow>(&format!(
            "SELECT {COLUMNS} FROM clientes ORDER BY id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(paginacion.limit())
        .bind(paginacion.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ClienteRow::into_record).collect())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Cliente>, RepositoryError> {
        let row = sqlx::query_as::<_, ClienteRow>(&format!(
            "SELECT {COLUMNS} FROM clientes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ClienteRow::into_record))
    }

    async fn search(&self, criterios: &CriteriosBusqueda) -> Result<Vec<Cliente>, RepositoryError> {
        // strpos instead of ILIKE so user input is never read as a pattern.
        let rows = sqlx::query_as::<_, ClienteRow>(&format!(
            "SELECT {COLUMNS} FROM clientes
             WHERE ($1::text IS NULL OR strpos(lower(nombre), lower($1)) > 0)
               AND ($2::text IS NULL OR strpos(lower(apellido), lower($2)) > 0)
               AND ($3::text IS NULL OR strpos(lower(email), lower($3)) > 0)
               AND ($4::text IS NULL OR strpos(lower(telefono), lower($4)) > 0)
             ORDER BY id ASC
             LIMIT $5"
        ))
        .bind(criterios.nombre.as_deref())
        .bind(criterios.apellido.as_deref())
        .bind(criterios.email.as_deref())
        .bind(criterios.telefono.as_deref())
        .bind(MAX_RESULTADOS_BUSQUEDA)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ClienteRow::into_record).collect())
    }

    async fn insert_batch(&self, clientes: Vec<NuevoCliente>) -> Result<Vec<Cliente>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut creados = Vec::with_capacity(clientes.len());
        let sql = format!(
            "INSERT INTO clientes (nombre, apellido, email, telefono, estado_civil, preferencia_contacto)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );

        for nuevo in &clientes {
            let row = sqlx::query_as::<_, ClienteRow>(&sql)
                .bind(&nuevo.nombre)
                .bind(&nuevo.apellido)
                .bind(&nuevo.email)
                .bind(&nuevo.telefono)
                .bind(nuevo.estado_civil.as_deref())
                .bind(nuevo.preferencia_contacto.as_deref())
                .fetch_one(&mut *tx)
                .await?;
            creados.push(row.into_record());
        }

        tx.commit().await?;
        Ok(creados)
    }

    async fn update(
        &self,
        id: i32,
        cambios: &ClienteCambios,
    ) -> Result<Option<Cliente>, RepositoryError> {
        let row = sqlx::query_as::<_, ClienteRow>(&format!(
            "UPDATE clientes SET
                 nombre = COALESCE($2, nombre),
                 apellido = COALESCE($3, apellido),
                 email = COALESCE($4, email),
                 telefono = COALESCE($5, telefono),
                 estado_civil = COALESCE($6, estado_civil),
                 preferencia_contacto = COALESCE($7, preferencia_contacto)
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(cambios.nombre.as_deref())
        .bind(cambios.apellido.as_deref())
        .bind(cambios.email.as_deref())
        .bind(cambios.telefono.as_deref())
        .bind(cambios.estado_civil.as_deref())
        .bind(cambios.preferencia_contacto.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ClienteRow::into_record))
    }

    async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM clientes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct ClienteRow {
    id: i32,
    nombre: String,
    apellido: String,
    email: String,
    telefono: String,
    estado_civil: Option<String>,
    preferencia_contacto: Option<String>,
    fecha_registro: DateTime<Utc>,
}

impl ClienteRow {
    fn into_record(self) -> Cliente {
        Cliente {
            id: self.id,
            nombre: self.nombre,
            apellido: self.apellido,
            email: self.email,
            telefono: self.telefono,
            estado_civil: self.estado_civil,
            preferencia_contacto: self.preferencia_contacto,
            fecha_registro: self.fecha_registro,
        }
    }
}
