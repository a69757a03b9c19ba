//! Throwaway databases for tests.

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tempfile::TempDir;

/// A fresh in-memory SQLite database with every migration applied.
///
/// Pinned to a single pooled connection: each SQLite memory connection
/// is its own database. Actions on it never overlap.
pub async fn migrated_sqlite() -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opts).await?;
    migrate(&db, MigrationCommand::Up).await?;
    Ok(db)
}

/// A migrated SQLite file shared by several pooled connections, so
/// transactions genuinely interleave. The file lives as long as this value.
pub struct SharedSqlite {
    pub db: DatabaseConnection,
    _dir: TempDir,
}

pub async fn migrated_shared_sqlite() -> Result<SharedSqlite, DbErr> {
    let dir = TempDir::new().map_err(|e| DbErr::Custom(format!("temp dir: {e}")))?;
    let path = dir.path().join("omi.sqlite");
    let mut opts = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    opts.max_connections(4)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opts).await?;
    // WAL lets readers proceed while one writer holds the lock; a reader
    // whose snapshot went stale is refused when it tries to write.
    db.execute_unprepared("PRAGMA journal_mode=WAL").await?;
    migrate(&db, MigrationCommand::Up).await?;
    Ok(SharedSqlite { db, _dir: dir })
}
