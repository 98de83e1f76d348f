//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (shared accept queue)
//!     → server.rs (worker accept loop, per-connection serving)
//!     → axum Router (method + path dispatch)
//!     → handlers.rs (parse directives → suspend → produce body)
//!     → response flushed to client
//! ```

pub mod handlers;
pub mod server;

pub use server::{ServerError, StubServer};
