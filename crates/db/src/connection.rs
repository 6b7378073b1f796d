use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

use medibot_core::config::DatabaseConfig;

pub type DbPool = sqlx::SqlitePool;

/// Opens the clinic store described by the `[database]` config section.
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&config.url, config.max_connections, config.timeout_secs).await
}

/// Sessions run with foreign keys on and WAL journaling. Writers back off
/// for the same window the pool waits on acquire before a lock surfaces as
/// a busy error.
pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    let timeout_secs = timeout_secs.max(1);
    let busy_timeout_pragma = format!("PRAGMA busy_timeout = {}", timeout_secs * 1000);

    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs))
        .after_connect(move |conn, _meta| {
            let busy_timeout_pragma = busy_timeout_pragma.clone();
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query(&busy_timeout_pragma).execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}
