//! devops-demo: a minimal HTTP service.
//!
//! Exposes `GET /` with service info and `GET /health` with uptime, boot time
//! and version. The library holds everything the binary wires together so the
//! routes and the server can be exercised from tests.

pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod state;

pub use app::{Application, BootRecord};
pub use config::AppConfig;
pub use error::AppError;
pub use self::http::{start_server, ServerError, ServerHandle};
