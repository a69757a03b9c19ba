//! Player actions against durable state.
//!
//! Each action loads the session (and its current round), computes the next
//! state with the domain machines, writes every touched row in one transaction
//! guarded by `lock_version`, and only then hands notifications to the fan-out.

use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::txn;
use crate::domain::session::TeamScore;
use crate::domain::{
    settle_round, Card, CardFace, GameRules, Player, RoundState, RoundView, SeedSource,
    SessionState, SessionStatus, Suit, Team, SEATS,
};
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::errors::ErrorCode;
use crate::repos::move_records::{self, MoveRecord};
use crate::repos::rounds::{self, StoredRound};
use crate::repos::sessions;
use crate::ws::fanout::{Fanout, Notification, PendingDelivery};
use crate::ws::protocol::{now_millis, round_id, ClientMsg, Inbound, ServerMsg};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Join(Team),
    StartGame,
    StartRound,
    SelectTrickSuit(Suit),
    PlayCard(Card),
}

impl PlayerAction {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerAction::Join(_) => "join",
            PlayerAction::StartGame => "start_game",
            PlayerAction::StartRound => "start_round",
            PlayerAction::SelectTrickSuit(_) => "select_trick_suit",
            PlayerAction::PlayCard(_) => "play_card",
        }
    }
}

/// Session as served to clients, with the version to pin follow-up actions on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub status: SessionStatus,
    pub created_by: String,
    pub current_active_slot: u8,
    pub current_round_number: u32,
    pub teams: [TeamScore; 2],
    pub players: Vec<Player>,
    pub last_round_tied: bool,
    pub last_round_winner: Option<Team>,
    pub winner: Option<Team>,
    pub version: i32,
}

impl SessionSnapshot {
    pub fn new(state: &SessionState, version: i32) -> Self {
        Self {
            id: state.id.clone(),
            status: state.status,
            created_by: state.created_by.clone(),
            current_active_slot: state.current_active_slot,
            current_round_number: state.current_round_no,
            teams: state.teams(),
            players: state.players.clone(),
            last_round_tied: state.last_round_tied,
            last_round_winner: state.last_round_winner,
            winner: state.winner,
            version,
        }
    }
}

/// What a committed action produced.
#[derive(Debug)]
pub struct ActionOutcome {
    pub session: SessionState,
    /// Session version after the commit.
    pub version: i32,
    /// Direct answer to the acting connection, if the action has one.
    pub reply: Option<ServerMsg>,
    pub notifications: Vec<Notification>,
    /// Fan-out of `notifications`, queued after the commit.
    pub delivery: PendingDelivery,
}

struct Applied {
    session: SessionState,
    version: i32,
    reply: Option<ServerMsg>,
    notifications: Vec<Notification>,
}

pub struct GameFlowService {
    db: DatabaseConnection,
    rules: GameRules,
    seeds: Arc<dyn SeedSource>,
    conflict_retries: u32,
    fanout: Arc<Fanout>,
}

impl GameFlowService {
    pub fn new(
        db: DatabaseConnection,
        rules: GameRules,
        seeds: Arc<dyn SeedSource>,
        conflict_retries: u32,
        fanout: Arc<Fanout>,
    ) -> Self {
        Self {
            db,
            rules,
            seeds,
            conflict_retries,
            fanout,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn fanout(&self) -> &Arc<Fanout> {
        &self.fanout
    }

    /// Open a lobby seated with its creator on RED slot 0.
    pub async fn create_session(&self, creator: &str) -> Result<SessionSnapshot, AppError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let state = SessionState::create(new_session_id(), creator, &self.rules);
            let tx = txn::begin(&self.db).await?;
            let out = sessions::create_session(&tx, &state, self.rules.starting_score).await;
            match txn::finish(tx, out).await {
                Ok(stored) => {
                    info!(session_id = %stored.state.id, creator, "session created");
                    return Ok(SessionSnapshot::new(&stored.state, stored.lock_version));
                }
                // An id collision surfaces as a unique violation; draw a new id.
                Err(err) if err.is_retryable() && attempt <= self.conflict_retries => {
                    warn!(creator, attempt, error = %err, "session insert conflicted, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    pub async fn join_session(
        &self,
        session_id: &str,
        user_id: &str,
        team: Team,
        expected_version: Option<i32>,
    ) -> Result<ActionOutcome, AppError> {
        self.run(session_id, user_id, PlayerAction::Join(team), expected_version)
            .await
    }

    pub async fn start_game(
        &self,
        session_id: &str,
        user_id: &str,
        expected_version: Option<i32>,
    ) -> Result<ActionOutcome, AppError> {
        self.run(session_id, user_id, PlayerAction::StartGame, expected_version)
            .await
    }

    pub async fn start_round(
        &self,
        session_id: &str,
        user_id: &str,
        expected_version: Option<i32>,
    ) -> Result<ActionOutcome, AppError> {
        self.run(session_id, user_id, PlayerAction::StartRound, expected_version)
            .await
    }

    pub async fn select_trick_suit(
        &self,
        session_id: &str,
        user_id: &str,
        suit: Suit,
        expected_version: Option<i32>,
    ) -> Result<ActionOutcome, AppError> {
        self.run(
            session_id,
            user_id,
            PlayerAction::SelectTrickSuit(suit),
            expected_version,
        )
        .await
    }

    pub async fn play_card(
        &self,
        session_id: &str,
        user_id: &str,
        card: Card,
        expected_version: Option<i32>,
    ) -> Result<ActionOutcome, AppError> {
        self.run(
            session_id,
            user_id,
            PlayerAction::PlayCard(card),
            expected_version,
        )
        .await
    }

    /// Route a parsed websocket frame to its action.
    pub async fn handle(
        &self,
        session_id: &str,
        user_id: &str,
        inbound: Inbound,
    ) -> Result<ActionOutcome, AppError> {
        let action = match inbound.msg {
            ClientMsg::GameStart => PlayerAction::StartGame,
            ClientMsg::RoundStart => PlayerAction::StartRound,
            ClientMsg::TrickSuitSelect { trick_suit } => PlayerAction::SelectTrickSuit(trick_suit),
            ClientMsg::PlayCard { played_card } => PlayerAction::PlayCard(played_card),
            ClientMsg::Health => {
                return Err(AppError::bad_request(
                    ErrorCode::BadRequest,
                    "HEALTH is answered by the connection",
                ))
            }
        };
        self.run(session_id, user_id, action, inbound.expected_version)
            .await
    }

    pub async fn session_snapshot(&self, session_id: &str) -> Result<SessionSnapshot, AppError> {
        let stored = sessions::require_session(&self.db, session_id).await?;
        Ok(SessionSnapshot::new(&stored.state, stored.lock_version))
    }

    /// The current round as `user_id` may see it.
    pub async fn round_view(&self, session_id: &str, user_id: &str) -> Result<RoundView, AppError> {
        let stored = sessions::require_session(&self.db, session_id).await?;
        let seat = stored.state.seat_of(user_id)?;
        let round = require_current_round(&self.db, &stored.state).await?;
        Ok(RoundView::for_seat(&round.state, seat))
    }

    /// Audit trail of a round's moves. Players only.
    pub async fn move_log(
        &self,
        session_id: &str,
        user_id: &str,
        round_no: u32,
    ) -> Result<Vec<MoveRecord>, AppError> {
        let stored = sessions::require_session(&self.db, session_id).await?;
        stored.state.seat_of(user_id)?;
        let round = rounds::find_round(&self.db, session_id, round_no)
            .await?
            .ok_or_else(|| round_not_found(session_id, round_no))?;
        Ok(move_records::list_for_round(&self.db, round.id).await?)
    }

    async fn run(
        &self,
        session_id: &str,
        user_id: &str,
        action: PlayerAction,
        expected_version: Option<i32>,
    ) -> Result<ActionOutcome, AppError> {
        let mut attempt = 0;
        let applied = loop {
            attempt += 1;
            match self
                .apply_once(session_id, user_id, action, expected_version)
                .await
            {
                Ok(applied) => break applied,
                Err(err)
                    if err.is_retryable()
                        && expected_version.is_none()
                        && attempt <= self.conflict_retries =>
                {
                    warn!(
                        session_id,
                        user_id,
                        action = action.name(),
                        attempt,
                        error = %err,
                        "version conflict, retrying against fresh state"
                    );
                }
                Err(err) => {
                    debug!(
                        session_id,
                        user_id,
                        action = action.name(),
                        error = %err,
                        "action rejected"
                    );
                    return Err(err.into());
                }
            }
        };

        info!(
            session_id,
            user_id,
            action = action.name(),
            version = applied.version,
            status = applied.session.status.as_str(),
            "action committed"
        );

        // Committed; delivery runs behind the caller and cannot affect the outcome.
        let delivery = self
            .fanout
            .enqueue(applied.session.clone(), applied.notifications.clone());

        Ok(ActionOutcome {
            session: applied.session,
            version: applied.version,
            reply: applied.reply,
            notifications: applied.notifications,
            delivery,
        })
    }

    async fn apply_once(
        &self,
        session_id: &str,
        user_id: &str,
        action: PlayerAction,
        expected_version: Option<i32>,
    ) -> Result<Applied, DomainError> {
        let tx = txn::begin(&self.db).await?;
        let out = self
            .compute(&tx, session_id, user_id, action, expected_version)
            .await;
        txn::finish(tx, out).await
    }

    async fn compute(
        &self,
        tx: &DatabaseTransaction,
        session_id: &str,
        user_id: &str,
        action: PlayerAction,
        expected_version: Option<i32>,
    ) -> Result<Applied, DomainError> {
        let stored = sessions::require_session(tx, session_id).await?;
        if let Some(expected) = expected_version {
            if expected != stored.lock_version {
                return Err(DomainError::conflict(
                    ConflictKind::OptimisticLock,
                    format!(
                        "Session {session_id} is at version {}, action was made against {expected}",
                        stored.lock_version
                    ),
                ));
            }
        }

        let mut session = stored.state.clone();
        let mut notifications = Vec::new();
        let mut reply = None;

        match action {
            PlayerAction::Join(team) => {
                let player = session.join(user_id, team)?;
                sessions::add_player(tx, session_id, &player).await?;
                notifications.push(Notification::Broadcast(ServerMsg::UserJoined {
                    user_id: player.user_id,
                    team: player.team,
                    slot: player.slot,
                    session_id: session_id.to_owned(),
                }));
            }

            PlayerAction::StartGame => {
                session.start_game(user_id)?;
                notifications.push(Notification::Broadcast(ServerMsg::GameStarted {
                    session_id: session_id.to_owned(),
                    started_by: user_id.to_owned(),
                    timestamp: now_millis(),
                }));
                reply = Some(ServerMsg::GameStartSuccess {
                    message: "Game started successfully".to_owned(),
                    session_id: session_id.to_owned(),
                    status: session.status,
                });
            }

            PlayerAction::StartRound => {
                let (round_no, caller) = session.begin_round(user_id)?;
                let round = RoundState::deal(round_no, self.seeds.next_seed(), caller);
                rounds::create_round(tx, session_id, &round).await?;
                debug!(session_id, round_no, caller, "round dealt");

                let rid = round_id(session_id, round_no);
                notifications.push(Notification::Broadcast(ServerMsg::RoundStart {
                    round_id: rid.clone(),
                    session_id: session_id.to_owned(),
                    current_round: round_no,
                    active_slot: caller,
                    session_status: session.status,
                    timestamp: now_millis(),
                }));
                notifications.push(Notification::Seat(
                    caller,
                    card_set(&rid, session_id, &round, caller, true),
                ));
            }

            PlayerAction::SelectTrickSuit(suit) => {
                let seat = session.ensure_trick_suit_phase(user_id)?;
                let mut round = require_current_round(tx, &session).await?;
                round.state.select_trick_suit(seat, suit)?;
                session.trick_suit_selected();
                rounds::save_round(tx, round.id, &round.state, round.lock_version).await?;

                let rid = round_id(session_id, round.state.round_no);
                notifications.push(Notification::Broadcast(ServerMsg::TrickSuitSelected {
                    round_id: rid.clone(),
                    session_id: session_id.to_owned(),
                    trick_suit: suit,
                    selected_by_slot: seat,
                    session_status: session.status,
                    timestamp: now_millis(),
                }));
                for s in 0..SEATS as u8 {
                    notifications.push(Notification::Seat(
                        s,
                        card_set(&rid, session_id, &round.state, s, false),
                    ));
                }
            }

            PlayerAction::PlayCard(card) => {
                let seat = session.ensure_game_play(user_id)?;
                let mut round = require_current_round(tx, &session).await?;
                let outcome = round.state.play_card(seat, card)?;

                let (plays, winner) = match &outcome.completed_move {
                    Some(done) => (done.plays.clone(), Some(done.winner)),
                    None => (round.state.current_move.clone(), None),
                };
                move_records::record_move(tx, round.id, outcome.move_no, &plays, winner).await?;

                let mut follow_ups = Vec::new();
                if let Some(done) = &outcome.completed_move {
                    follow_ups.push(ServerMsg::MoveWon {
                        r#move: done.move_no,
                        won_by_team: done.winner_team,
                        won_by_slot: done.winner.slot,
                        session_status: session.status,
                    });
                }
                if outcome.round_complete {
                    let settlement = settle_round(
                        round.state.move_wins,
                        round.state.caller_slot,
                        session.last_round_tied,
                    );
                    let applied = session.apply_settlement(settlement, &self.rules);
                    info!(
                        session_id,
                        round_no = round.state.round_no,
                        tied = settlement.tied,
                        loser = ?settlement.loser,
                        deduction = settlement.deduction,
                        "round settled"
                    );
                    follow_ups.push(ServerMsg::RoundWon {
                        round: round.state.round_no,
                        active_slot: applied.next_active_slot,
                        round_lost_team: settlement.loser,
                        round_won_team: settlement.winner,
                        is_round_tied: settlement.tied,
                        teams: session.teams(),
                        session_status: session.status,
                    });
                    if let Some(winner) = applied.game_winner {
                        info!(session_id, winner = %winner, "game ended");
                        follow_ups.push(ServerMsg::GameEnded {
                            session_id: session_id.to_owned(),
                            winner,
                            teams: session.teams(),
                            session_status: session.status,
                        });
                    }
                }
                rounds::save_round(tx, round.id, &round.state, round.lock_version).await?;

                notifications.push(Notification::Broadcast(ServerMsg::CardPlayed {
                    card: CardFace::from(card),
                    slot: seat,
                    current_move: outcome.move_no,
                    move_cards: plays,
                    is_first_move: outcome.is_first_in_move,
                    is_last_move: outcome.is_last_in_move,
                    session_status: session.status,
                }));
                notifications.extend(follow_ups.into_iter().map(Notification::Broadcast));
            }
        }

        let version = sessions::save_session(tx, &session, stored.lock_version).await?;
        Ok(Applied {
            session,
            version,
            reply,
            notifications,
        })
    }
}

fn card_set(
    rid: &str,
    session_id: &str,
    round: &RoundState,
    seat: u8,
    is_first_set: bool,
) -> ServerMsg {
    ServerMsg::ReceiveCardSet {
        round_id: rid.to_owned(),
        session_id: session_id.to_owned(),
        player_slot: seat,
        cards: round
            .visible_hand(seat)
            .into_iter()
            .map(CardFace::from)
            .collect(),
        is_first_set,
        trick_suit: round.trick_suit,
        timestamp: now_millis(),
    }
}

fn round_not_found(session_id: &str, round_no: u32) -> DomainError {
    DomainError::not_found(
        NotFoundKind::Round,
        format!("Round {round_no} of session {session_id} not found"),
    )
}

async fn require_current_round<C: sea_orm::ConnectionTrait + Send + Sync>(
    conn: &C,
    session: &SessionState,
) -> Result<StoredRound, DomainError> {
    rounds::find_round(conn, &session.id, session.current_round_no)
        .await?
        .ok_or_else(|| round_not_found(&session.id, session.current_round_no))
}

const SESSION_ID_SUFFIX_LEN: u32 = 4;

/// Base-36 creation time followed by random base-36 digits.
pub fn new_session_id() -> String {
    let millis = u64::try_from(now_millis()).unwrap_or_default();
    let suffix = u64::from(rand::random::<u32>()) % 36_u64.pow(SESSION_ID_SUFFIX_LEN);
    format!(
        "{}{:0>width$}",
        to_base36(millis),
        to_base36(suffix),
        width = SESSION_ID_SUFFIX_LEN as usize
    )
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
