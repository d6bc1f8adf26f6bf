use std::sync::Arc;

use critica_mail::Mailer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: critica_db::DbPool,
    /// Server configuration (JWT and confirmation-code secrets live here).
    pub config: Arc<ServerConfig>,
    /// Delivers confirmation codes to new users.
    pub mailer: Arc<dyn Mailer>,
}
