//! HTTP API server
//!
//! Exposes the conversion pipeline over axum.

pub mod api_server;
pub mod handlers;
pub mod types;

pub use api_server::{router, start_api_server};
pub use handlers::AppState;
