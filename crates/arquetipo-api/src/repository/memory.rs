//! In-memory repositories.
//!
//! Backed by [`Table`], a thread-safe ordered map with a serial id counter.
//! The lock is `parking_lot` and never held across `.await`; every
//! read-modify-write happens under one write guard.

use std::collections::BTreeMap;
use std::sync::Arc;

use arquetipo_core::{
    Cliente, ClienteCambios, CriteriosBusqueda, NuevoCliente, Paginacion, Usuario,
    MAX_RESULTADOS_BUSQUEDA,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::{
    ClienteRepository, NuevoUsuario, RepositoryError, UsuarioRepository, NOMBRE_USUARIO_DUPLICADO,
};

#[derive(Debug)]
struct TableInner<T> {
    rows: BTreeMap<i32, T>,
    next_id: i32,
}

/// Thread-safe, cloneable table keyed by a serial `i32`, iterated in id order.
#[derive(Debug)]
pub struct Table<T: Clone + Send + Sync> {
    inner: Arc<RwLock<TableInner<T>>>,
}

impl<T: Clone + Send + Sync> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync> Table<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(TableInner {
                rows: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }

    pub fn get(&self, id: i32) -> Option<T> {
        self.inner.read().rows.get(&id).cloned()
    }

    /// Rows in id order, after skipping `offset`, up to `limit`.
    pub fn page(&self, offset: usize, limit: usize) -> Vec<T> {
        self.inner
            .read()
            .rows
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Rows matching `pred` in id order, up to `limit`.
    pub fn filter(&self, limit: usize, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.inner
            .read()
            .rows
            .values()
            .filter(|row| pred(*row))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.inner.read().rows.values().find(|row| pred(*row)).cloned()
    }

    /// Insert every row built by `build` under one write lock. `build`
    /// receives the id assigned to each row; a failure inserts nothing.
    pub fn insert_all<I, E>(
        &self,
        items: Vec<I>,
        mut build: impl FnMut(i32, I, &BTreeMap<i32, T>) -> Result<T, E>,
    ) -> Result<Vec<T>, E> {
        let mut guard = self.inner.write();
        let mut next_id = guard.next_id;
        let mut staged = Vec::with_capacity(items.len());
        for item in items {
            let row = build(next_id, item, &guard.rows)?;
            staged.push((next_id, row));
            next_id += 1;
        }
        guard.next_id = next_id;
        let mut out = Vec::with_capacity(staged.len());
        for (id, row) in staged {
            out.push(row.clone());
            guard.rows.insert(id, row);
        }
        Ok(out)
    }

    /// Mutate a row in place. Returns the updated row, or `None` if not found.
    pub fn update(&self, id: i32, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.inner.write();
        guard.rows.get_mut(&id).map(|row| {
            f(row);
            row.clone()
        })
    }

    /// Mutate the first row matching `pred`. `false` when none matched.
    pub fn update_where(&self, pred: impl Fn(&T) -> bool, f: impl FnOnce(&mut T)) -> bool {
        let mut guard = self.inner.write();
        match guard.rows.values_mut().find(|row| pred(&**row)) {
            Some(row) => {
                f(row);
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: i32) -> Option<T> {
        self.inner.write().rows.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn to_usize(value: i64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// [`ClienteRepository`] over an in-memory [`Table`].
#[derive(Debug, Clone, Default)]
pub struct MemoryClienteRepository {
    table: Table<Cliente>,
}

impl MemoryClienteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[async_trait]
impl ClienteRepository for MemoryClienteRepository {
    async fn list(&self, paginacion: Paginacion) -> Result<Vec<Cliente>, RepositoryError> {
        Ok(self
            .table
            .page(to_usize(paginacion.offset()), to_usize(paginacion.limit())))
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Cliente>, RepositoryError> {
        Ok(self.table.get(id))
    }

    async fn search(&self, criterios: &CriteriosBusqueda) -> Result<Vec<Cliente>, RepositoryError> {
        Ok(self
            .table
            .filter(to_usize(MAX_RESULTADOS_BUSQUEDA), |c| criterios.coincide(c)))
    }

    async fn insert_batch(&self, clientes: Vec<NuevoCliente>) -> Result<Vec<Cliente>, RepositoryError> {
        let ahora = Utc::now();
        self.table
            .insert_all(clientes, |id, nuevo, _| Ok(nuevo.into_cliente(id, ahora)))
    }

    async fn update(
        &self,
        id: i32,
        cambios: &ClienteCambios,
    ) -> Result<Option<Cliente>, RepositoryError> {
        Ok(self.table.update(id, |c| cambios.aplicar(c)))
    }

    async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        Ok(self.table.remove(id).is_some())
    }
}

/// [`UsuarioRepository`] over an in-memory [`Table`].
#[derive(Debug, Clone, Default)]
pub struct MemoryUsuarioRepository {
    table: Table<Usuario>,
}

impl MemoryUsuarioRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsuarioRepository for MemoryUsuarioRepository {
    async fn find_by_nombre(&self, nombre_usuario: &str) -> Result<Option<Usuario>, RepositoryError> {
        Ok(self.table.find(|u| u.nombre_usuario == nombre_usuario))
    }

    async fn create(&self, nuevo: NuevoUsuario) -> Result<Usuario, RepositoryError> {
        let mut creados = self.table.insert_all(vec![nuevo], |id, nuevo, rows| {
            if rows.values().any(|u| u.nombre_usuario == nuevo.nombre_usuario) {
                return Err(RepositoryError::Duplicate(NOMBRE_USUARIO_DUPLICADO.to_string()));
            }
            Ok(Usuario {
                id,
                nombre_usuario: nuevo.nombre_usuario,
                password_hash: nuevo.password_hash,
                roles: nuevo.roles,
                esta_activo: true,
            })
        })?;
        creados
            .pop()
            .ok_or_else(|| RepositoryError::Database(sqlx::Error::RowNotFound))
    }

    async fn set_activo(&self, nombre_usuario: &str, activo: bool) -> Result<bool, RepositoryError> {
        Ok(self
            .table
            .update_where(|u| u.nombre_usuario == nombre_usuario, |u| u.esta_activo = activo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nuevo(nombre: &str) -> NuevoCliente {
        NuevoCliente::new(nombre, "Prueba", format!("{}@test.com", nombre.to_lowercase()), "900")
    }

    #[tokio::test]
    async fn ids_are_serial_and_listing_is_ordered() {
        let repo = MemoryClienteRepository::new();
        let creados = repo
            .insert_batch(vec![nuevo("Ana"), nuevo("Beto"), nuevo("Carla")])
            .await
            .unwrap();
        assert_eq!(creados.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        let pagina = repo.list(Paginacion::new(Some(2), Some(2))).await.unwrap();
        assert_eq!(pagina.len(), 1);
        assert_eq!(pagina[0].nombre, "Carla");
    }

    #[tokio::test]
    async fn search_caps_at_ten_in_id_order() {
        let repo = MemoryClienteRepository::new();
        let batch = (0..15).map(|i| nuevo(&format!("Cliente{i}"))).collect();
        repo.insert_batch(batch).await.unwrap();

        let encontrados = repo.search(&CriteriosBusqueda::default()).await.unwrap();
        assert_eq!(encontrados.len(), 10);
        assert!(encontrados.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(encontrados[0].id, 1);
    }

    #[tokio::test]
    async fn update_missing_id_does_not_mutate() {
        let repo = MemoryClienteRepository::new();
        repo.insert_batch(vec![nuevo("Ana")]).await.unwrap();
        let cambios = ClienteCambios::reemplazo("X", "Y", "x@y.cl", "1");
        assert!(repo.update(99, &cambios).await.unwrap().is_none());
        assert_eq!(repo.get_by_id(1).await.unwrap().unwrap().nombre, "Ana");
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let repo = MemoryClienteRepository::new();
        repo.insert_batch(vec![nuevo("Ana")]).await.unwrap();
        assert!(repo.delete(1).await.unwrap());
        assert!(!repo.delete(1).await.unwrap());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let repo = MemoryUsuarioRepository::new();
        let u = NuevoUsuario {
            nombre_usuario: "ana".into(),
            password_hash: "h".into(),
            roles: None,
        };
        let creado = repo.create(u.clone()).await.unwrap();
        assert_eq!(creado.id, 1);
        assert!(creado.esta_activo);
        assert!(matches!(
            repo.create(u).await,
            Err(RepositoryError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn set_activo_toggles_flag() {
        let repo = MemoryUsuarioRepository::new();
        repo.create(NuevoUsuario {
            nombre_usuario: "ana".into(),
            password_hash: "h".into(),
            roles: None,
        })
        .await
        .unwrap();
        assert!(repo.set_activo("ana", false).await.unwrap());
        assert!(!repo.find_by_nombre("ana").await.unwrap().unwrap().esta_activo);
        assert!(!repo.set_activo("nadie", false).await.unwrap());
    }
}
