// Rule violations are rejected with a reason code and change nothing.

use backend_test_support::unique_helpers::unique_str;
use omi_backend::domain::{Card, GameRules, Suit, Team};
use omi_backend::{AppError, ErrorCode};

use crate::support::table::{build_flow, Table, GOLDEN_SEED};

/// Run `attempt` and check it fails with `code` while the snapshot stays put.
macro_rules! assert_rejected {
    ($table:expr, $code:expr, $attempt:expr) => {{
        let before = $table.flow.session_snapshot(&$table.session_id).await?;
        let err = $attempt.await.unwrap_err();
        assert_eq!(err.code(), $code, "{err:?}");
        let after = $table.flow.session_snapshot(&$table.session_id).await?;
        assert_eq!(after, before);
    }};
}

fn card(id: u8) -> Card {
    Card::new(id).unwrap()
}

#[tokio::test]
async fn lobby_rules() -> Result<(), AppError> {
    let table = Table::seated(GameRules::default(), GOLDEN_SEED).await?;
    let sid = table.session_id.as_str();

    assert_rejected!(
        table,
        ErrorCode::SessionFull,
        table.flow.join_session(sid, &unique_str("late"), Team::Red, None)
    );
    assert_rejected!(
        table,
        ErrorCode::NotCreator,
        table.flow.start_game(sid, table.user(2), None)
    );
    assert_rejected!(
        table,
        ErrorCode::PhaseMismatch,
        table.flow.start_round(sid, table.user(0), None)
    );
    Ok(())
}

#[tokio::test]
async fn team_capacity_and_table_size() -> Result<(), AppError> {
    let (flow, _registry) = build_flow(GameRules::default(), GOLDEN_SEED).await?;
    let creator = unique_str("creator");
    let sid = flow.create_session(&creator).await?.id;

    let red = unique_str("red");
    flow.join_session(&sid, &red, Team::Red, None).await?;
    let err = flow
        .join_session(&sid, &red, Team::Black, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AlreadyJoined);

    let err = flow
        .join_session(&sid, &unique_str("red"), Team::Red, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::TeamFull);

    let err = flow.start_game(&sid, &creator, None).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotEnoughPlayers);
    Ok(())
}

#[tokio::test]
async fn trump_selection_rules() -> Result<(), AppError> {
    let table = Table::dealt(GameRules::default(), GOLDEN_SEED).await?;
    let sid = table.session_id.as_str();

    assert_rejected!(
        table,
        ErrorCode::NotCaller,
        table.flow.select_trick_suit(sid, table.user(1), Suit::Hearts, None)
    );
    assert_rejected!(
        table,
        ErrorCode::PhaseMismatch,
        table.flow.play_card(sid, table.user(0), card(11), None)
    );
    assert_rejected!(
        table,
        ErrorCode::NotAPlayer,
        table
            .flow
            .select_trick_suit(sid, &unique_str("outsider"), Suit::Hearts, None)
    );

    table.select(0, Suit::Spades).await?;
    assert_rejected!(
        table,
        ErrorCode::TrickSuitAlreadySelected,
        table.flow.select_trick_suit(sid, table.user(0), Suit::Clubs, None)
    );
    Ok(())
}

#[tokio::test]
async fn card_play_rules() -> Result<(), AppError> {
    let table = Table::dealt(GameRules::default(), GOLDEN_SEED).await?;
    let sid = table.session_id.as_str();
    table.select(0, Suit::Spades).await?;

    // Seat 1 holds 12; seat 0 leads.
    assert_rejected!(
        table,
        ErrorCode::OutOfTurn,
        table.flow.play_card(sid, table.user(1), card(12), None)
    );
    assert_rejected!(
        table,
        ErrorCode::CardNotInHand,
        table.flow.play_card(sid, table.user(0), card(12), None)
    );

    // 11 is a Heart; seat 1 must follow with a Heart, not 26.
    table.flow.play_card(sid, table.user(0), card(11), None).await?;
    let view_before = table.flow.round_view(sid, table.user(1)).await?;
    let err = table
        .flow
        .play_card(sid, table.user(1), card(26), None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::MustFollowSuit);
    assert_eq!(table.flow.round_view(sid, table.user(1)).await?, view_before);
    Ok(())
}

#[tokio::test]
async fn reads_are_scoped_to_players() -> Result<(), AppError> {
    let table = Table::dealt(GameRules::default(), GOLDEN_SEED).await?;

    let err = table
        .flow
        .round_view(&table.session_id, &unique_str("outsider"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotAPlayer);

    let err = table.flow.session_snapshot("nope").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::SessionNotFound);
    assert_eq!(err.status().as_u16(), 404);

    let err = table
        .flow
        .move_log(&table.session_id, table.user(0), 9)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::RoundNotFound);
    Ok(())
}

#[tokio::test]
async fn only_the_caller_sees_cards_before_trump() -> Result<(), AppError> {
    let table = Table::dealt(GameRules::default(), GOLDEN_SEED).await?;

    let caller = table.flow.round_view(&table.session_id, table.user(0)).await?;
    let ids: Vec<u8> = caller.hand.iter().map(|c| c.number).collect();
    assert_eq!(ids, vec![11, 24, 21, 16]);

    let other = table.flow.round_view(&table.session_id, table.user(1)).await?;
    assert!(other.hand.is_empty());
    assert_eq!(other.hand_sizes, [8, 8, 8, 8]);
    Ok(())
}
