//! Shared application state for request handlers.

use std::sync::Arc;

use crate::app::BootRecord;
use crate::clock::Clock;
use crate::config::AppConfig;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Everything in here is immutable after construction; handlers only read.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub boot: BootRecord,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Creates a new application state from the resolved configuration, the
    /// captured boot record and the clock handlers should read.
    pub fn new(config: Arc<AppConfig>, boot: BootRecord, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            boot,
            clock,
        }
    }
}
