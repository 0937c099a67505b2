use crate::core::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgConnection, PgPool};
use std::time::Duration;

/// Advisory lock keys, one per self-referencing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeLock {
    Categories,
    Comments,
}

impl TreeLock {
    fn key(self) -> i64 {
        match self {
            TreeLock::Categories => 0x0b10_0001,
            TreeLock::Comments => 0x0b10_0002,
        }
    }
}

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
}

/// Serializes structural changes to one tree table until the surrounding
/// transaction ends. Must be called on a connection inside a transaction.
pub async fn lock_tree(conn: &mut PgConnection, lock: TreeLock) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(lock.key())
        .execute(conn)
        .await?;
    Ok(())
}
