pub mod config;
pub mod http;
pub mod store;

use std::sync::Arc;
use std::time::Instant;

use config::ServerConfig;
use store::TaskStore;

/// Shared application state injected into every request handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    /// Authoritative in-memory task registry.
    pub store: Arc<TaskStore>,
    pub started_at: Instant,
}
