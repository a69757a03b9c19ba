// Optimistic concurrency: pinned versions, racing actions.
//
// Racing tests run on a shared SQLite file with several pooled connections,
// so both transactions really read the same version before either commits.

use std::collections::BTreeSet;
use std::time::Duration;

use backend_test_support::db::migrated_shared_sqlite;
use backend_test_support::unique_helpers::unique_str;
use omi_backend::db::txn;
use omi_backend::domain::{Card, GameRules, SessionStatus, Suit, Team};
use omi_backend::repos::{rounds, sessions};
use omi_backend::{AppError, ErrorCode};

use crate::support::table::{build_flow, build_flow_on, Table, GOLDEN_SEED};

#[tokio::test]
async fn stale_pin_is_rejected_without_retry() -> Result<(), AppError> {
    let table = Table::dealt(Default::default(), GOLDEN_SEED).await?;
    let before = table.flow.session_snapshot(&table.session_id).await?;

    let err = table
        .flow
        .select_trick_suit(
            &table.session_id,
            table.user(0),
            Suit::Spades,
            Some(before.version - 1),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::OptimisticLock);
    assert_eq!(err.status().as_u16(), 409);
    assert!(err.is_retryable());

    let after = table.flow.session_snapshot(&table.session_id).await?;
    assert_eq!(after, before);

    let outcome = table
        .flow
        .select_trick_suit(
            &table.session_id,
            table.user(0),
            Suit::Spades,
            Some(before.version),
        )
        .await?;
    assert_eq!(outcome.session.status, SessionStatus::GamePlay);
    assert_eq!(outcome.version, before.version + 1);
    Ok(())
}

#[tokio::test]
async fn every_commit_bumps_the_version_once() -> Result<(), AppError> {
    let (flow, _registry) = build_flow(Default::default(), GOLDEN_SEED).await?;
    let creator = unique_str("creator");
    let created = flow.create_session(&creator).await?;

    let joined = flow
        .join_session(&created.id, &unique_str("p1"), Team::Black, Some(created.version))
        .await?;
    assert_eq!(joined.version, created.version + 1);

    // The pin from before the join is now stale.
    let err = flow
        .join_session(&created.id, &unique_str("p2"), Team::Red, Some(created.version))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::OptimisticLock);
    assert_eq!(flow.session_snapshot(&created.id).await?.players.len(), 2);
    Ok(())
}

#[tokio::test]
async fn unpinned_action_retries_against_a_competing_commit() -> Result<(), AppError> {
    let shared = migrated_shared_sqlite().await?;
    let table =
        Table::dealt_on(build_flow_on(shared.db.clone(), GameRules::default(), GOLDEN_SEED)).await?;
    let sid = table.session_id.clone();
    let before = table.flow.session_snapshot(&sid).await?;

    // Another writer picks Hearts and holds its transaction open.
    let rival = txn::begin(&shared.db).await?;
    let stored = sessions::require_session(&rival, &sid).await?;
    let mut round = rounds::find_round(&rival, &sid, stored.state.current_round_no)
        .await?
        .expect("round dealt");
    round.state.select_trick_suit(0, Suit::Hearts)?;
    let mut state = stored.state.clone();
    state.trick_suit_selected();
    rounds::save_round(&rival, round.id, &round.state, round.lock_version).await?;
    sessions::save_session(&rival, &state, stored.lock_version).await?;

    // The coordinator reads the pre-rival version, then waits on the write lock.
    let flow = table.flow.clone();
    let caller = table.user(0).to_owned();
    let racer_sid = sid.clone();
    let racer = tokio::spawn(async move {
        flow.select_trick_suit(&racer_sid, &caller, Suit::Spades, None)
            .await
    });
    tokio::time::sleep(Duration::from_millis(200)).await;
    txn::finish(rival, Ok(())).await?;

    // The retry sees the committed trump and rejects on the fresh state.
    let err = racer.await.expect("racer task").unwrap_err();
    assert_eq!(err.code(), ErrorCode::TrickSuitAlreadySelected);

    let after = table.flow.session_snapshot(&sid).await?;
    assert_eq!(after.version, before.version + 1);
    assert_eq!(after.status, SessionStatus::GamePlay);
    let view = table.flow.round_view(&sid, table.user(0)).await?;
    assert_eq!(view.trick_suit, Some(Suit::Hearts));
    Ok(())
}

#[tokio::test]
async fn racing_plays_of_one_card_commit_once() -> Result<(), AppError> {
    let shared = migrated_shared_sqlite().await?;
    let table =
        Table::dealt_on(build_flow_on(shared.db.clone(), GameRules::default(), GOLDEN_SEED)).await?;
    table.select(0, Suit::Spades).await?;
    let lead = Card::new(11)?;

    let (a, b) = tokio::join!(
        table.flow.play_card(&table.session_id, table.user(0), lead, None),
        table.flow.play_card(&table.session_id, table.user(0), lead, None),
    );
    let results = [a, b];
    let committed = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(committed, 1);

    // The loser either retried onto the new state or was refused outright.
    let loser = results
        .into_iter()
        .find_map(Result::err)
        .expect("one play must fail");
    assert!(
        matches!(
            loser.code(),
            ErrorCode::OutOfTurn | ErrorCode::CardNotInHand | ErrorCode::OptimisticLock
        ),
        "unexpected rejection {loser:?}"
    );

    let log = table.flow.move_log(&table.session_id, table.user(0), 1).await?;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].played_cards.len(), 1);

    let view = table.flow.round_view(&table.session_id, table.user(0)).await?;
    assert_eq!(view.hand.len(), 7);
    assert_eq!(view.move_current_slot, 1);
    Ok(())
}

#[tokio::test]
async fn concurrent_joins_take_distinct_seats() -> Result<(), AppError> {
    let shared = migrated_shared_sqlite().await?;
    let (flow, _registry) = build_flow_on(shared.db.clone(), GameRules::default(), GOLDEN_SEED);
    let created = flow.create_session(&unique_str("creator")).await?;
    let sid = created.id.as_str();
    let (u1, u2, u3) = (unique_str("a"), unique_str("b"), unique_str("c"));

    let (a, b, c) = tokio::join!(
        flow.join_session(sid, &u1, Team::Black, None),
        flow.join_session(sid, &u2, Team::Black, None),
        flow.join_session(sid, &u3, Team::Red, None),
    );
    a?;
    b?;
    c?;

    let snapshot = flow.session_snapshot(sid).await?;
    let seats: BTreeSet<u8> = snapshot.players.iter().map(|p| p.slot).collect();
    assert_eq!(seats, BTreeSet::from([0, 1, 2, 3]));
    assert_eq!(snapshot.version, created.version + 3);
    Ok(())
}
