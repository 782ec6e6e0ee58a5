//! # Cliente Handler
//!
//! Shared by both API versions. Version differences live in the route
//! layer: V1 updates arrive as [`ClienteCambios::reemplazo`], V2 updates as
//! [`ClienteCambios::parcial`].
//!
//! Absent ids (`None`) behave like ids that do not exist: reads return an
//! empty list, mutations return `false`.

use std::sync::Arc;

use arquetipo_core::{Cliente, ClienteCambios, CriteriosBusqueda, NuevoCliente, Paginacion};

use crate::error::AppError;
use crate::repository::ClienteRepository;

#[derive(Clone)]
pub struct ClienteHandler {
    repo: Arc<dyn ClienteRepository>,
}

impl ClienteHandler {
    pub fn new(repo: Arc<dyn ClienteRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, paginacion: Paginacion) -> Result<Vec<Cliente>, AppError> {
        Ok(self.repo.list(paginacion).await?)
    }

    pub async fn get_by_id(&self, id: Option<i32>) -> Result<Vec<Cliente>, AppError> {
        let Some(id) = id else {
            return Ok(Vec::new());
        };
        Ok(self.repo.get_by_id(id).await?.into_iter().collect())
    }

    pub async fn search(&self, criterios: CriteriosBusqueda) -> Result<Vec<Cliente>, AppError> {
        Ok(self.repo.search(&criterios.normalizado()).await?)
    }

    /// Validate then insert the whole batch in one unit.
    pub async fn create(&self, clientes: Vec<NuevoCliente>) -> Result<Vec<Cliente>, AppError> {
        NuevoCliente::validate_batch(&clientes)?;
        let creados = self.repo.insert_batch(clientes).await?;
        tracing::info!(count = creados.len(), "clientes created");
        Ok(creados)
    }

    /// `false` when `id` is absent or unknown.
    pub async fn update(&self, id: Option<i32>, cambios: ClienteCambios) -> Result<bool, AppError> {
        let Some(id) = id else {
            return Ok(false);
        };
        cambios.validate()?;
        Ok(self.repo.update(id, &cambios).await?.is_some())
    }

    /// `false` when `id` is absent or unknown.
    pub async fn delete(&self, id: Option<i32>) -> Result<bool, AppError> {
        match id {
            Some(id) => Ok(self.repo.delete(id).await?),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryClienteRepository, RepositoryError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts repository calls and delegates to the in-memory store.
    #[derive(Default)]
    struct CountingRepository {
        inner: MemoryClienteRepository,
        calls: AtomicUsize,
    }

    impl CountingRepository {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ClienteRepository for CountingRepository {
        async fn list(&self, p: Paginacion) -> Result<Vec<Cliente>, RepositoryError> {
            self.hit();
            self.inner.list(p).await
        }
        async fn get_by_id(&self, id: i32) -> Result<Option<Cliente>, RepositoryError> {
            self.hit();
            self.inner.get_by_id(id).await
        }
        async fn search(&self, c: &CriteriosBusqueda) -> Result<Vec<Cliente>, RepositoryError> {
            self.hit();
            self.inner.search(c).await
        }
        async fn insert_batch(&self, c: Vec<NuevoCliente>) -> Result<Vec<Cliente>, RepositoryError> {
            self.hit();
            self.inner.insert_batch(c).await
        }
        async fn update(
            &self,
            id: i32,
            c: &ClienteCambios,
        ) -> Result<Option<Cliente>, RepositoryError> {
            self.hit();
            self.inner.update(id, c).await
        }
        async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
            self.hit();
            self.inner.delete(id).await
        }
    }

    fn handler() -> (ClienteHandler, Arc<CountingRepository>) {
        let repo = Arc::new(CountingRepository::default());
        (ClienteHandler::new(repo.clone()), repo)
    }

    fn nuevo(nombre: &str) -> NuevoCliente {
        NuevoCliente::new(nombre, "Soto", format!("{}@correo.cl", nombre.to_lowercase()), "+56911111111")
    }

    #[tokio::test]
    async fn empty_batch_never_reaches_storage() {
        let (h, repo) = handler();
        let err = h.create(vec![]).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "La lista de clientes no puede estar vacía."));
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn invalid_row_rejects_whole_batch() {
        let (h, repo) = handler();
        let mut malo = nuevo("Luis");
        malo.email = "sin-arroba".into();
        assert!(h.create(vec![nuevo("Ana"), malo]).await.is_err());
        assert_eq!(repo.calls(), 0);
        assert!(repo.inner.is_empty());
    }

    #[tokio::test]
    async fn absent_id_reads_empty_and_skips_storage() {
        let (h, repo) = handler();
        assert!(h.get_by_id(None).await.unwrap().is_empty());
        assert!(!h.delete(None).await.unwrap());
        assert!(!h.update(None, ClienteCambios::reemplazo("a", "b", "c@d.cl", "1")).await.unwrap());
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_id_is_empty_or_false() {
        let (h, _) = handler();
        assert!(h.get_by_id(Some(404)).await.unwrap().is_empty());
        assert!(!h.delete(Some(404)).await.unwrap());
        assert!(!h
            .update(Some(404), ClienteCambios::reemplazo("a", "b", "c@d.cl", "1"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn create_then_get_round_trips_fields() {
        let (h, _) = handler();
        let creados = h.create(vec![nuevo("Roberto")]).await.unwrap();
        let leido = h.get_by_id(Some(creados[0].id)).await.unwrap();
        assert_eq!(leido.len(), 1);
        assert_eq!(leido[0].nombre, "Roberto");
        assert_eq!(leido[0].apellido, "Soto");
        assert_eq!(leido[0].email, "roberto@correo.cl");
        assert_eq!(leido[0].telefono, "+56911111111");
    }

    #[tokio::test]
    async fn update_with_invalid_email_is_rejected() {
        let (h, repo) = handler();
        let id = h.create(vec![nuevo("Ana")]).await.unwrap()[0].id;
        let before = repo.calls();
        let err = h
            .update(Some(id), ClienteCambios::reemplazo("Ana", "Soto", "malo", "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(repo.calls(), before);
    }

    #[tokio::test]
    async fn search_blank_criteria_caps_at_ten_in_id_order() {
        let (h, _) = handler();
        let batch: Vec<_> = (0..12).map(|i| nuevo(&format!("Cliente{i}"))).collect();
        h.create(batch).await.unwrap();

        let criterios = CriteriosBusqueda {
            nombre: Some("  ".into()),
            ..Default::default()
        };
        let encontrados = h.search(criterios).await.unwrap();
        assert_eq!(encontrados.len(), 10);
        assert!(encontrados.windows(2).all(|w| w[0].id < w[1].id));
    }
}
