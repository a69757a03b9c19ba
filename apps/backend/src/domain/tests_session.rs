use crate::domain::session::{GameRules, SessionState, SessionStatus};
use crate::domain::Team;
use crate::errors::domain::ValidationKind;

fn lobby() -> SessionState {
    SessionState::create("s1", "alice", &GameRules::default())
}

fn full_lobby() -> SessionState {
    let mut session = lobby();
    session.join("bob", Team::Black).unwrap();
    session.join("carol", Team::Red).unwrap();
    session.join("dave", Team::Black).unwrap();
    session
}

#[test]
fn creator_is_seated_red_zero() {
    let session = lobby();
    assert_eq!(session.status, SessionStatus::Waiting);
    assert_eq!(session.players.len(), 1);
    assert_eq!(session.seat_of("alice").unwrap(), 0);
    assert_eq!(session.red_score, 10);
    assert_eq!(session.black_score, 10);
    assert_eq!(session.current_active_slot, 0);
    assert_eq!(session.current_round_no, 0);
}

#[test]
fn joins_take_lower_free_team_seat() {
    let session = full_lobby();
    assert_eq!(session.seat_of("bob").unwrap(), 1);
    assert_eq!(session.seat_of("carol").unwrap(), 2);
    assert_eq!(session.seat_of("dave").unwrap(), 3);
}

#[test]
fn join_rejects_duplicates_full_teams_and_full_tables() {
    let mut session = lobby();
    let err = session.join("alice", Team::Black).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::AlreadyJoined));

    session.join("carol", Team::Red).unwrap();
    let err = session.join("erin", Team::Red).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::TeamFull));

    let mut full = full_lobby();
    let err = full.join("erin", Team::Black).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::SessionFull));
}

#[test]
fn only_creator_starts_and_only_with_four() {
    let mut session = lobby();
    session.join("bob", Team::Black).unwrap();
    let err = session.start_game("alice").unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotEnoughPlayers));

    let mut session = full_lobby();
    let err = session.start_game("bob").unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotCreator));

    session.start_game("alice").unwrap();
    assert_eq!(session.status, SessionStatus::Active);

    let err = session.join("erin", Team::Red).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::PhaseMismatch));
}

#[test]
fn only_active_seat_begins_round() {
    let mut session = full_lobby();
    let err = session.begin_round("alice").unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::PhaseMismatch));

    session.start_game("alice").unwrap();
    let err = session.begin_round("bob").unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotCaller));

    let err = session.begin_round("mallory").unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotAPlayer));

    assert_eq!(session.begin_round("alice").unwrap(), (1, 0));
    assert_eq!(session.status, SessionStatus::SelectTrickSuit);
    assert_eq!(session.current_round_no, 1);

    let err = session.begin_round("alice").unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::PhaseMismatch));
}

#[test]
fn trump_phase_distinguishes_repeat_selection() {
    let mut session = full_lobby();
    let err = session.ensure_trick_suit_phase("alice").unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::PhaseMismatch));

    session.start_game("alice").unwrap();
    session.begin_round("alice").unwrap();
    assert_eq!(session.ensure_trick_suit_phase("alice").unwrap(), 0);

    session.trick_suit_selected();
    let err = session.ensure_trick_suit_phase("alice").unwrap_err();
    assert_eq!(
        err.validation_kind(),
        Some(&ValidationKind::TrickSuitAlreadySelected)
    );
}

#[test]
fn ended_game_rejects_everything() {
    let mut session = full_lobby();
    session.start_game("alice").unwrap();
    session.status = SessionStatus::GameEnded;
    for err in [
        session.clone().begin_round("alice").unwrap_err(),
        session.ensure_game_play("bob").unwrap_err(),
        session.ensure_trick_suit_phase("alice").unwrap_err(),
    ] {
        assert_eq!(err.validation_kind(), Some(&ValidationKind::GameEnded));
    }
}

#[test]
fn status_strings_round_trip() {
    for status in [
        SessionStatus::Waiting,
        SessionStatus::Active,
        SessionStatus::SelectTrickSuit,
        SessionStatus::GamePlay,
        SessionStatus::RoundEnded,
        SessionStatus::GameEnded,
    ] {
        assert_eq!(SessionStatus::parse(status.as_str()).unwrap(), status);
        assert_eq!(
            serde_json::to_value(status).unwrap(),
            serde_json::Value::String(status.as_str().to_owned())
        );
    }
}
