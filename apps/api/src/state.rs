use sqlx::PgPool;

/// Shared application state injected into all route handlers via Axum extractors.
/// The pool is the single process-wide storage handle; components never reach
/// for a global connection.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
}
