//! Application construction.
//!
//! [`Application::build`] wires configuration, clock and routes together and
//! captures the [`BootRecord`] exactly once. Each call produces an independent
//! application with its own boot record, so several can coexist in one
//! process (tests rely on this).

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use chrono::{DateTime, Utc};

use crate::clock::{format_iso8601, Clock, SystemClock};
use crate::config::AppConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// Moment the application was built, on both the wall clock and the monotonic clock.
#[derive(Debug, Clone)]
pub struct BootRecord {
    boot_time: DateTime<Utc>,
    boot_time_iso: Arc<str>,
    started: Instant,
}

impl BootRecord {
    /// Reads `clock` once and records the result.
    pub fn capture(clock: &dyn Clock) -> Self {
        let started = clock.instant();
        let boot_time = clock.now();
        Self {
            boot_time,
            boot_time_iso: format_iso8601(boot_time).into(),
            started,
        }
    }

    pub fn boot_time(&self) -> DateTime<Utc> {
        self.boot_time
    }

    /// Boot time as reported on the wire. Formatted once so every response
    /// carries the same bytes.
    pub fn boot_time_iso(&self) -> &str {
        &self.boot_time_iso
    }

    /// Monotonic time since capture according to `clock`.
    pub fn uptime(&self, clock: &dyn Clock) -> Duration {
        clock.elapsed_since(self.started)
    }
}

/// A built application: resolved configuration, boot record and the fully
/// layered router.
#[derive(Debug, Clone)]
pub struct Application {
    config: Arc<AppConfig>,
    boot: BootRecord,
    router: Router,
}

impl Application {
    /// Builds the application against the system clock.
    pub fn build(config: AppConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Builds the application against the given clock.
    pub fn with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        let config = Arc::new(config);
        let boot = BootRecord::capture(clock.as_ref());
        let state = AppState::new(config.clone(), boot.clone(), clock);
        let router = create_router(state);

        tracing::debug!(
            boot_time = %boot.boot_time_iso(),
            version = %config.app.version,
            "Application built"
        );

        Self {
            config,
            boot,
            router,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn boot_record(&self) -> &BootRecord {
        &self.boot
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}
