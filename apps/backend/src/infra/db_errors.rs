//! SeaORM -> DomainError translation helpers.
//!
//! Adapters should convert `sea_orm::DbErr` into `crate::errors::domain::DomainError`
//! here, and higher layers can then map `DomainError` to `AppError` via `From`.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};

pub const OPTIMISTIC_LOCK_PREFIX: &str = "OPTIMISTIC_LOCK:";
pub const SEALED_MOVE_PREFIX: &str = "SEALED_MOVE:";
pub const SESSION_NOT_FOUND_PREFIX: &str = "SESSION_NOT_FOUND:";

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

#[derive(serde::Deserialize)]
struct LockInfo {
    entity: String,
    expected: i32,
    actual: i32,
}

/// Structured error emitted by adapters when a conditional update matched no row.
pub fn optimistic_lock_err(entity: &str, expected: i32, actual: i32) -> sea_orm::DbErr {
    sea_orm::DbErr::Custom(format!(
        "{OPTIMISTIC_LOCK_PREFIX}{}",
        serde_json::json!({ "entity": entity, "expected": expected, "actual": actual })
    ))
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e)
    }
}

/// Translate a `DbErr` into a `DomainError` with sanitized detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();

    match &e {
        sea_orm::DbErr::RecordNotFound(_) => {
            return DomainError::not_found(
                NotFoundKind::Other("Record".into()),
                "Record not found",
            );
        }
        sea_orm::DbErr::Custom(msg) if msg.starts_with(SESSION_NOT_FOUND_PREFIX) => {
            let session_id = msg.trim_start_matches(SESSION_NOT_FOUND_PREFIX);
            warn!(session_id, "Session not found");
            return DomainError::not_found(
                NotFoundKind::Session,
                format!("Session {session_id} not found"),
            );
        }
        sea_orm::DbErr::Custom(msg) if msg.starts_with(SEALED_MOVE_PREFIX) => {
            let key = msg.trim_start_matches(SEALED_MOVE_PREFIX);
            warn!(move_record = key, "Write to sealed move record rejected");
            return DomainError::conflict(
                ConflictKind::SealedMoveRecord,
                format!("Move record {key} is already sealed"),
            );
        }
        sea_orm::DbErr::Custom(msg) if msg.starts_with(OPTIMISTIC_LOCK_PREFIX) => {
            let json_str = msg.trim_start_matches(OPTIMISTIC_LOCK_PREFIX);
            if let Ok(info) = serde_json::from_str::<LockInfo>(json_str) {
                warn!(
                    entity = %info.entity,
                    expected = info.expected,
                    actual = info.actual,
                    "Optimistic lock conflict detected"
                );
                return DomainError::conflict(
                    ConflictKind::OptimisticLock,
                    format!(
                        "{} was modified concurrently (expected version {}, actual version {}). Please refresh and retry.",
                        info.entity, info.expected, info.actual
                    ),
                );
            }

            warn!("Optimistic lock conflict detected (version info unavailable)");
            return DomainError::conflict(
                ConflictKind::OptimisticLock,
                "Resource was modified by another transaction; please retry",
            );
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(raw_error = %error_msg, "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if mentions_sqlstate(&error_msg, "23505")
        || error_msg.contains("duplicate key value violates unique constraint")
        || error_msg.contains("UNIQUE constraint failed")
    {
        warn!(raw_error = %error_msg, "Unique constraint violation");
        // Two writers inserting the same round or move row lost a race.
        return DomainError::conflict(
            ConflictKind::OptimisticLock,
            "Concurrent insert of the same record; please retry",
        );
    }

    if mentions_sqlstate(&error_msg, "23503") {
        warn!(raw_error = %error_msg, "Foreign key constraint violation");
        return DomainError::validation_other("Foreign key constraint violation");
    }

    if error_msg.contains("database is locked") || mentions_sqlstate(&error_msg, "40001") {
        warn!(raw_error = %error_msg, "Serialization failure");
        return DomainError::conflict(
            ConflictKind::OptimisticLock,
            "Concurrent transaction conflict; please retry",
        );
    }

    if error_msg.contains("timeout")
        || error_msg.contains("pool")
        || error_msg.contains("unavailable")
    {
        warn!(raw_error = %error_msg, "Database timeout or pool issue");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(raw_error = %error_msg, "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}
