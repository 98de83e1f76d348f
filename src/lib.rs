//! Header-driven HTTP stub server for load-testing clients.
//!
//! Callers steer each request with headers: an artificial delay (exact or
//! sampled from a range) and, on the payload endpoint, the response body
//! length. Delays never hold a runtime thread and oversized payloads are
//! streamed from a fixed per-worker buffer, so memory stays bounded no matter
//! what the caller asks for.

pub mod config;
pub mod directives;
pub mod http;
pub mod pool;

pub use config::ServerConfig;
pub use directives::ControlDirectives;
pub use http::StubServer;
pub use pool::ContentPool;
