//! # Application State
//!
//! Shared across all Axum handlers via `State<AppState>`. Cloning is cheap:
//! every field is either an `Arc` or a handle that wraps one.
//!
//! Storage is chosen once at startup: [`AppState::with_postgres`] when a
//! database pool is available, [`AppState::in_memory`] otherwise.

use std::sync::Arc;

use arquetipo_operaciones::OperacionesClient;
use sqlx::PgPool;

use crate::auth::{ActiveUserCheck, PasswordHasher, TokenService, TokenValidatedHook};
use crate::config::AppConfig;
use crate::db::{PgClienteRepository, PgUsuarioRepository};
use crate::handlers::ClienteHandler;
use crate::repository::{
    ClienteRepository, MemoryClienteRepository, MemoryUsuarioRepository, UsuarioRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub clientes: ClienteHandler,
    pub usuarios: Arc<dyn UsuarioRepository>,
    pub tokens: TokenService,
    pub passwords: PasswordHasher,

    /// Run in order after a token's signature and claims check out. The
    /// first hook is always the active-user re-check.
    pub token_hooks: Arc<Vec<Arc<dyn TokenValidatedHook>>>,

    /// `None` when `OPERACIONES_URL` is unset; the Util routes then
    /// answer 503.
    pub operaciones: Option<OperacionesClient>,

    /// Checked by the readiness endpoint when present.
    pub db_pool: Option<PgPool>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("tokens", &self.tokens)
            .field("token_hooks", &self.token_hooks.len())
            .field("operaciones", &self.operaciones.is_some())
            .field("db_pool", &self.db_pool.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: AppConfig,
        clientes: Arc<dyn ClienteRepository>,
        usuarios: Arc<dyn UsuarioRepository>,
    ) -> Self {
        let tokens = TokenService::new(&config.jwt);
        let active_user: Arc<dyn TokenValidatedHook> = Arc::new(ActiveUserCheck::new(usuarios.clone()));
        Self {
            config: Arc::new(config),
            clientes: ClienteHandler::new(clientes),
            usuarios,
            tokens,
            passwords: PasswordHasher::new(),
            token_hooks: Arc::new(vec![active_user]),
            operaciones: None,
            db_pool: None,
        }
    }

    /// Volatile storage. Data is lost on restart.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(
            config,
            Arc::new(MemoryClienteRepository::new()),
            Arc::new(MemoryUsuarioRepository::new()),
        )
    }

    pub fn with_postgres(config: AppConfig, pool: PgPool) -> Self {
        let mut state = Self::new(
            config,
            Arc::new(PgClienteRepository::new(pool.clone())),
            Arc::new(PgUsuarioRepository::new(pool.clone())),
        );
        state.db_pool = Some(pool);
        state
    }

    pub fn with_operaciones(mut self, client: OperacionesClient) -> Self {
        self.operaciones = Some(client);
        self
    }

    pub fn with_password_hasher(mut self, passwords: PasswordHasher) -> Self {
        self.passwords = passwords;
        self
    }

    /// Append a hook that runs after the active-user re-check.
    pub fn with_token_hook(mut self, hook: Arc<dyn TokenValidatedHook>) -> Self {
        let mut hooks = self.token_hooks.as_ref().clone();
        hooks.push(hook);
        self.token_hooks = Arc::new(hooks);
        self
    }
}
