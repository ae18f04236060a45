//! HTTP server module.
//!
//! Binds the application router to a TCP listener and hands back a
//! [`ServerHandle`] that reports the bound address and allows the server to be
//! stopped from outside.

mod server;

pub use server::{start_server, ServerError, ServerHandle};
