//! Application handlers. Routes translate HTTP into calls on these and
//! never touch repositories directly.

pub mod cliente;

pub use cliente::ClienteHandler;
