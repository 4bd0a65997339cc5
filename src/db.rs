use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;

use crate::constants::EXPECTED_DB_VERSION;
use crate::queries::{ddl, metadata};

type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Open a file-based database pool for production use.
/// Creates the file if missing, enables WAL mode and foreign keys.
pub async fn open_database(db_path: &Path) -> Result<SqlitePool, DynError> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Create tables and indexes if they don't exist yet
pub async fn init_database_schema(pool: &SqlitePool) -> Result<(), DynError> {
    for sql in [
        ddl::create_metadata_table(),
        ddl::create_users_table(),
        ddl::create_sessions_table(),
        ddl::create_runners_table(),
        ddl::create_runs_table(),
        ddl::create_runs_user_date_index(),
        ddl::create_sessions_user_id_index(),
    ] {
        sqlx::query(&sql).execute(pool).await?;
    }
    Ok(())
}

/// Stamp a fresh database with the schema version, or verify an existing one
pub async fn ensure_version(pool: &SqlitePool) -> Result<(), DynError> {
    let existing: Option<String> = sqlx::query_scalar(&metadata::select_by_key("version"))
        .fetch_optional(pool)
        .await?;

    match existing {
        None => {
            sqlx::query(&metadata::upsert("version", EXPECTED_DB_VERSION))
                .execute(pool)
                .await?;
            Ok(())
        }
        Some(version) if version == EXPECTED_DB_VERSION => Ok(()),
        Some(version) => Err(format!(
            "Unsupported database version: '{}'. This application only supports version '{}'",
            version, EXPECTED_DB_VERSION
        )
        .into()),
    }
}

/// Open, create the schema and check the version in one go
pub async fn open_and_init(db_path: &Path) -> Result<SqlitePool, DynError> {
    let pool = open_database(db_path).await?;
    init_database_schema(&pool).await?;
    ensure_version(&pool).await?;
    Ok(pool)
}

/// Create a database in a temporary directory for testing.
/// Keep the returned guard alive for as long as the pool is used.
pub async fn create_test_connection_in_temporary_file(
) -> Result<(SqlitePool, tempfile::TempDir), DynError> {
    let guard = tempfile::tempdir()?;
    let pool = open_database(&guard.path().join("test.sqlite")).await?;
    Ok((pool, guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_creates_tables() {
        let (pool, _guard) = create_test_connection_in_temporary_file().await.unwrap();
        init_database_schema(&pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('metadata', 'users', 'sessions', 'runners', 'runs')",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(tables.len(), 5);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let (pool, _guard) = create_test_connection_in_temporary_file().await.unwrap();
        init_database_schema(&pool).await.unwrap();
        init_database_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_version_stamped_then_checked() {
        let (pool, _guard) = create_test_connection_in_temporary_file().await.unwrap();
        init_database_schema(&pool).await.unwrap();
        ensure_version(&pool).await.unwrap();
        ensure_version(&pool).await.unwrap();

        sqlx::query(&metadata::upsert("version", "0"))
            .execute(&pool)
            .await
            .unwrap();
        let err = ensure_version(&pool).await.unwrap_err();
        assert!(err.to_string().contains("Unsupported database version"));
    }
}
