//! Database pool initialization.
//!
//! SYSTEM CONTEXT
//! ==============
//! Startup uses this module to create the shared SQLx pool. The schema is
//! owned by the auth service's ORM, so nothing here creates or migrates
//! tables; the pool is only checked for connectivity.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Initialize the `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns an error if the initial connection fails.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
