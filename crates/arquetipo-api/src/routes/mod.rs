//! # API Route Modules
//!
//! | Prefix | Module | Auth |
//! |--------|--------|------|
//! | `/api/v1/cliente`, `/api/v2/cliente` | [`clientes`] | none |
//! | `/api/Auth` | [`auth`] | none |
//! | `/api/v1/UserJWT` | [`user_jwt`] | bearer |
//! | `/api/v1/Util`, `/api/v2/Util` | [`util`] | bearer |
//!
//! Each module exposes a `router()` returning `Router<AppState>`; bearer
//! protection is applied in [`crate::app`].

pub mod auth;
pub mod clientes;
pub mod user_jwt;
pub mod util;
