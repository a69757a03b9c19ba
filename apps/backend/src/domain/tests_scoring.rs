use crate::domain::scoring::{settle_round, MoveWins};
use crate::domain::session::{GameRules, SessionState, SessionStatus};
use crate::domain::Team;

fn wins(red: u8, black: u8) -> MoveWins {
    MoveWins { red, black }
}

#[test]
fn caller_team_losing_pays_two() {
    // Caller seat 1 is BLACK; BLACK lost 3-5.
    let s = settle_round(wins(5, 3), 1, false);
    assert!(!s.tied);
    assert_eq!(s.loser, Some(Team::Black));
    assert_eq!(s.winner, Some(Team::Red));
    assert_eq!(s.deduction, 2);
}

#[test]
fn non_caller_team_losing_pays_one() {
    // Caller seat 0 is RED; BLACK lost without calling.
    let s = settle_round(wins(5, 3), 0, false);
    assert_eq!(s.loser, Some(Team::Black));
    assert_eq!(s.deduction, 1);
}

#[test]
fn loss_after_tied_round_always_pays_two() {
    let s = settle_round(wins(5, 3), 0, true);
    assert_eq!(s.loser, Some(Team::Black));
    assert_eq!(s.deduction, 2);
}

#[test]
fn tie_changes_nothing() {
    let s = settle_round(wins(4, 4), 2, true);
    assert!(s.tied);
    assert_eq!(s.loser, None);
    assert_eq!(s.deduction, 0);
}

fn started_session() -> SessionState {
    let rules = GameRules::default();
    let mut session = SessionState::create("s1", "alice", &rules);
    session.join("bob", Team::Black).unwrap();
    session.join("carol", Team::Red).unwrap();
    session.join("dave", Team::Black).unwrap();
    session.start_game("alice").unwrap();
    session
}

#[test]
fn tie_sets_memory_and_still_rotates_caller() {
    let rules = GameRules::default();
    let mut session = started_session();
    let applied = session.apply_settlement(settle_round(wins(4, 4), 0, false), &rules);
    assert!(session.last_round_tied);
    assert_eq!(session.red_score, 10);
    assert_eq!(session.black_score, 10);
    assert_eq!(applied.next_active_slot, 1);
    assert_eq!(session.status, SessionStatus::RoundEnded);
}

#[test]
fn settlement_clears_tie_memory_and_records_winner() {
    let rules = GameRules::default();
    let mut session = started_session();
    session.last_round_tied = true;
    session.apply_settlement(settle_round(wins(2, 6), 0, true), &rules);
    assert_eq!(session.red_score, 8);
    assert!(!session.last_round_tied);
    assert_eq!(session.last_round_winner, Some(Team::Black));
}

#[test]
fn reaching_losing_score_ends_game() {
    let rules = GameRules::default();
    let mut session = started_session();
    session.red_score = 1;
    let applied = session.apply_settlement(settle_round(wins(3, 5), 0, false), &rules);
    assert_eq!(session.red_score, -1);
    assert_eq!(session.status, SessionStatus::GameEnded);
    assert_eq!(applied.game_winner, Some(Team::Black));
}
