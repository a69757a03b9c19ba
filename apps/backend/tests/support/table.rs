//! A four-player table driven through the coordinator.

use std::sync::Arc;
use std::time::Duration;

use backend_test_support::db::migrated_sqlite;
use backend_test_support::unique_helpers::unique_table;
use omi_backend::domain::tricks::legal_cards;
use omi_backend::domain::{Card, FixedSeedSource, GameRules, Seat, Suit, Team};
use omi_backend::services::game_flow::{ActionOutcome, GameFlowService};
use omi_backend::ws::{ConnectionRegistry, Fanout, RetryPolicy};
use omi_backend::AppError;
use sea_orm::DatabaseConnection;

use super::sink::RecordingSink;

/// Seed whose first round, with Spades called from seat 0 and the first
/// legal card played each turn, ends RED 3 / BLACK 5.
pub const GOLDEN_SEED: u32 = 12345;

pub struct Table {
    pub flow: Arc<GameFlowService>,
    pub registry: Arc<ConnectionRegistry>,
    pub session_id: String,
    /// Users by seat: creator on 0 (RED), then 1 BLACK, 2 RED, 3 BLACK.
    pub users: [String; 4],
}

pub fn fast_retries() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
    }
}

/// Coordinator over a fresh migrated database with a fixed seed.
pub async fn build_flow(
    rules: GameRules,
    seed: u32,
) -> Result<(Arc<GameFlowService>, Arc<ConnectionRegistry>), AppError> {
    Ok(build_flow_on(migrated_sqlite().await?, rules, seed))
}

pub fn build_flow_on(
    db: DatabaseConnection,
    rules: GameRules,
    seed: u32,
) -> (Arc<GameFlowService>, Arc<ConnectionRegistry>) {
    let registry = Arc::new(ConnectionRegistry::new(Duration::from_secs(3600)));
    let fanout = Arc::new(Fanout::new(registry.clone(), fast_retries()));
    let flow = Arc::new(GameFlowService::new(
        db,
        rules,
        Arc::new(FixedSeedSource(seed)),
        3,
        fanout,
    ));
    (flow, registry)
}

impl Table {
    /// Created and fully seated, still waiting.
    pub async fn seated(rules: GameRules, seed: u32) -> Result<Self, AppError> {
        Self::seated_on(build_flow(rules, seed).await?).await
    }

    pub async fn seated_on(
        (flow, registry): (Arc<GameFlowService>, Arc<ConnectionRegistry>),
    ) -> Result<Self, AppError> {
        let users = unique_table("omi");
        let snapshot = flow.create_session(&users[0]).await?;
        flow.join_session(&snapshot.id, &users[1], Team::Black, None)
            .await?;
        flow.join_session(&snapshot.id, &users[2], Team::Red, None)
            .await?;
        flow.join_session(&snapshot.id, &users[3], Team::Black, None)
            .await?;
        Ok(Self {
            flow,
            registry,
            session_id: snapshot.id,
            users,
        })
    }

    /// Seated, started, first round dealt and waiting for trump.
    pub async fn dealt(rules: GameRules, seed: u32) -> Result<Self, AppError> {
        Self::dealt_on(build_flow(rules, seed).await?).await
    }

    pub async fn dealt_on(
        parts: (Arc<GameFlowService>, Arc<ConnectionRegistry>),
    ) -> Result<Self, AppError> {
        let table = Self::seated_on(parts).await?;
        table
            .flow
            .start_game(&table.session_id, &table.users[0], None)
            .await?;
        table
            .flow
            .start_round(&table.session_id, &table.users[0], None)
            .await?;
        Ok(table)
    }

    /// Register a recording connection for the user on `seat`.
    pub fn connect(&self, seat: Seat) -> Arc<RecordingSink> {
        let sink = Arc::new(RecordingSink::default());
        self.registry
            .register(&self.session_id, &self.users[seat as usize], sink.clone());
        sink
    }

    pub fn user(&self, seat: Seat) -> &str {
        &self.users[seat as usize]
    }

    pub async fn select(&self, seat: Seat, suit: Suit) -> Result<ActionOutcome, AppError> {
        self.flow
            .select_trick_suit(&self.session_id, self.user(seat), suit, None)
            .await
    }

    /// Whose turn it is and the first card they may legally play.
    pub async fn next_legal(&self) -> Result<(Seat, Card), AppError> {
        let view = self.flow.round_view(&self.session_id, self.user(0)).await?;
        let seat = view.move_current_slot;
        let own = self.flow.round_view(&self.session_id, self.user(seat)).await?;
        let hand: Vec<Card> = own
            .hand
            .iter()
            .map(|face| Card::new(face.number))
            .collect::<Result<_, _>>()?;
        let follow = if own.current_move.is_empty() {
            None
        } else {
            own.current_suit
        };
        Ok((seat, legal_cards(&hand, follow)[0]))
    }

    /// Play the first legal card each turn until the round settles.
    pub async fn play_out_round(&self) -> Result<Vec<ActionOutcome>, AppError> {
        let mut outcomes = Vec::new();
        loop {
            let (seat, card) = self.next_legal().await?;
            let outcome = self
                .flow
                .play_card(&self.session_id, self.user(seat), card, None)
                .await?;
            let done = outcome
                .notifications
                .iter()
                .any(|n| notification_action(n) == "ROUND_WON");
            outcomes.push(outcome);
            if done {
                return Ok(outcomes);
            }
        }
    }
}

pub fn notification_action(note: &omi_backend::ws::Notification) -> &'static str {
    match note {
        omi_backend::ws::Notification::Broadcast(msg) => msg.action(),
        omi_backend::ws::Notification::Seat(_, msg) => msg.action(),
    }
}
