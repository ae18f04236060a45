//! HTTP server startup logic.
//!
//! The server goes through three states: not started, listening, stopped.
//! [`start_server`] only returns once the listener is bound, so a port
//! conflict surfaces as an error from that call rather than later.

use std::io;
use std::net::{IpAddr, SocketAddr};

use axum::Router;
use axum_server::Handle;
use tokio::task::JoinHandle;

use crate::config::HttpServerConfig;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address {host}:{port}: {reason}")]
    InvalidAddress {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("Failed to bind server: {0}")]
    Bind(#[source] io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Control handle over a running server.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    handle: Handle,
    task: JoinHandle<io::Result<()>>,
}

impl ServerHandle {
    /// Address the listener is actually bound to. When port 0 was requested
    /// this carries the port the OS picked.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Stops accepting connections and closes open ones immediately.
    pub fn shutdown(&self) {
        tracing::info!(addr = %self.local_addr, "Shutting down server");
        self.handle.shutdown();
    }

    /// Waits for the accept loop to stop.
    pub async fn wait(self) -> Result<(), ServerError> {
        match self.task.await {
            Ok(Ok(())) => {
                tracing::debug!(addr = %self.local_addr, "Server stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(ServerError::Server(e.to_string())),
            Err(e) => Err(ServerError::Server(format!("server task failed: {}", e))),
        }
    }
}

/// Resolves `host:port` into a socket address. `host` must be an IP literal.
pub fn listen_addr(config: &HttpServerConfig) -> Result<SocketAddr, ServerError> {
    let host = config.host.trim().trim_start_matches('[').trim_end_matches(']');
    host.parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, config.port))
        .map_err(|e| ServerError::InvalidAddress {
            host: config.host.clone(),
            port: config.port,
            reason: e.to_string(),
        })
}

/// Bind the router to the configured address and start serving.
///
/// Returns once the listener is bound. Serving continues in a background task
/// until [`ServerHandle::shutdown`] is called.
pub async fn start_server(app: Router, config: &HttpServerConfig) -> Result<ServerHandle, ServerError> {
    let addr = listen_addr(config)?;
    let handle = Handle::new();

    tracing::debug!(%addr, "Binding HTTP server");

    let server = axum_server::bind(addr).handle(handle.clone());
    let mut task = tokio::spawn(async move { server.serve(app.into_make_service()).await });

    let listening = tokio::select! {
        listening = handle.listening() => listening,
        result = &mut task => {
            return Err(match result {
                Ok(Ok(())) => ServerError::Server("server exited before listening".to_string()),
                Ok(Err(e)) => ServerError::Bind(e),
                Err(e) => ServerError::Server(format!("server task failed: {}", e)),
            });
        }
    };

    let Some(local_addr) = listening else {
        // Bind failed; the task holds the reason.
        return Err(match task.await {
            Ok(Err(e)) => ServerError::Bind(e),
            Ok(Ok(())) => ServerError::Server("server exited before listening".to_string()),
            Err(e) => ServerError::Server(format!("server task failed: {}", e)),
        });
    };

    tracing::info!(addr = %local_addr, port = local_addr.port(), "Server listening");

    Ok(ServerHandle {
        local_addr,
        handle,
        task,
    })
}
