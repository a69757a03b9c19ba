//! Transaction lifecycle helpers: commit on Ok, roll back on Err.

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::warn;

use crate::errors::domain::DomainError;

pub async fn begin(db: &DatabaseConnection) -> Result<DatabaseTransaction, DomainError> {
    Ok(db.begin().await?)
}

/// Close `txn` according to `out`. The original error wins over a failed rollback.
pub async fn finish<T>(
    txn: DatabaseTransaction,
    out: Result<T, DomainError>,
) -> Result<T, DomainError> {
    match out {
        Ok(val) => {
            txn.commit().await?;
            Ok(val)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
