pub mod txn;

use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::info;

use crate::errors::domain::DomainError;

/// Open a pool for `url`. In-memory SQLite is pinned to one connection so
/// every query sees the same database.
pub async fn connect(url: &str) -> Result<DatabaseConnection, DomainError> {
    let mut opts = ConnectOptions::new(url.to_owned());
    opts.connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if url.starts_with("sqlite::memory:") || url.contains("mode=memory") {
        opts.max_connections(1).min_connections(1);
    } else {
        opts.max_connections(16);
    }
    let db = Database::connect(opts).await?;
    info!(backend = ?db.get_database_backend(), "database connected");
    Ok(db)
}

/// Connect and bring the schema up to date.
pub async fn connect_and_migrate(url: &str) -> Result<DatabaseConnection, DomainError> {
    let db = connect(url).await?;
    migrate(&db, MigrationCommand::Up).await?;
    Ok(db)
}
