use crate::db::Database;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pooled handle opened once at startup; cloning shares the pool.
    pub db: Database,
}
