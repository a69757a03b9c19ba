// Conditional saves: a write against a version that has since moved on is a
// retryable conflict carrying both versions, and leaves the row untouched.

use backend_test_support::db::migrated_sqlite;
use backend_test_support::unique_helpers::unique_str;
use omi_backend::db::txn;
use omi_backend::domain::{GameRules, RoundState, SessionState, Suit, Team};
use omi_backend::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use omi_backend::repos::{rounds, sessions};
use omi_backend::AppError;

fn expect_lock_conflict(err: DomainError, expected: i32, actual: i32) {
    match err {
        DomainError::Conflict(ConflictKind::OptimisticLock, detail) => {
            assert!(
                detail.contains(&format!("expected version {expected}")),
                "detail should name the expected version, got: {detail}"
            );
            assert!(
                detail.contains(&format!("actual version {actual}")),
                "detail should name the actual version, got: {detail}"
            );
        }
        other => panic!("expected OptimisticLock, got: {other:?}"),
    }
}

async fn stored_session(
    db: &sea_orm::DatabaseConnection,
) -> Result<sessions::StoredSession, AppError> {
    let rules = GameRules::default();
    let state = SessionState::create(&unique_str("s"), &unique_str("creator"), &rules);
    Ok(sessions::create_session(db, &state, rules.starting_score).await?)
}

#[tokio::test]
async fn second_save_on_the_same_session_version_conflicts() -> Result<(), AppError> {
    let db = migrated_sqlite().await?;
    let stored = stored_session(&db).await?;
    assert_eq!(stored.lock_version, 1);

    let mut first = stored.state.clone();
    first.join(&unique_str("p1"), Team::Black)?;
    let mut second = stored.state.clone();
    second.red_score = 3;

    let tx = txn::begin(&db).await?;
    let bumped = sessions::save_session(&tx, &first, stored.lock_version).await?;
    assert_eq!(bumped, 2);

    let err = sessions::save_session(&tx, &second, stored.lock_version)
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    expect_lock_conflict(err, 1, 2);
    txn::finish(tx, Ok(())).await?;

    let reloaded = sessions::require_session(&db, &stored.state.id).await?;
    assert_eq!(reloaded.lock_version, 2);
    assert_eq!(reloaded.state.red_score, stored.state.red_score);
    Ok(())
}

#[tokio::test]
async fn second_save_on_the_same_round_version_conflicts() -> Result<(), AppError> {
    let db = migrated_sqlite().await?;
    let stored = stored_session(&db).await?;
    let round = rounds::create_round(&db, &stored.state.id, &RoundState::deal(1, 12345, 0)).await?;

    let mut spades = round.state.clone();
    spades.select_trick_suit(0, Suit::Spades)?;
    let mut hearts = round.state.clone();
    hearts.select_trick_suit(0, Suit::Hearts)?;

    let bumped = rounds::save_round(&db, round.id, &spades, round.lock_version).await?;
    assert_eq!(bumped, round.lock_version + 1);

    let err = rounds::save_round(&db, round.id, &hearts, round.lock_version)
        .await
        .unwrap_err();
    expect_lock_conflict(err, round.lock_version, round.lock_version + 1);

    let reloaded = rounds::find_round(&db, &stored.state.id, 1)
        .await?
        .expect("round exists");
    assert_eq!(reloaded.state.trick_suit, Some(Suit::Spades));
    Ok(())
}

#[tokio::test]
async fn saving_a_missing_session_is_not_found() -> Result<(), AppError> {
    let db = migrated_sqlite().await?;
    let state = SessionState::create(&unique_str("ghost"), "nobody", &GameRules::default());

    let err = sessions::save_session(&db, &state, 1).await.unwrap_err();
    assert!(
        matches!(err, DomainError::NotFound(NotFoundKind::Session, _)),
        "expected NotFound(Session), got: {err:?}"
    );
    Ok(())
}
