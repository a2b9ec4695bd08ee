use std::sync::Arc;

use crate::config::ServerConfig;
use crate::enrollment::{EnrollmentLifecycle, PgEnrollmentStore};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: coursehub_db::DbPool,
    /// Server configuration (JWT secret, timeouts).
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(pool: coursehub_db::DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }

    /// Enrollment lifecycle backed by this state's database pool.
    pub fn enrollments(&self) -> EnrollmentLifecycle<PgEnrollmentStore> {
        EnrollmentLifecycle::new(PgEnrollmentStore::new(self.pool.clone()))
    }
}
