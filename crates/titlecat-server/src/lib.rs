//! HTTP transport for titlecat.
//!
//! One operation: `POST /predict` with `{"title": "..."}` answers
//! `{"prediction": <label>}`. Validation errors are 400, pipeline failures
//! are 500; both carry `{"error", "code"}` bodies. Cross-origin requests are
//! accepted from a single configured origin.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, serve};
