//! Delivery of notifications to the live connections of a session.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::future::join_all;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::domain::{Seat, SessionState};
use crate::ws::protocol::ServerMsg;
use crate::ws::registry::{Connection, ConnectionRegistry, DeliveryError};

/// How long a session's delivery worker waits for work before exiting.
const WORKER_IDLE: Duration = Duration::from_secs(60);

/// Bounded exponential backoff for a single connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): base, 2*base, 4*base...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Counts from one fan-out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
    pub deregistered: usize,
}

/// Addressing of one notification produced by a game action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Broadcast(ServerMsg),
    Seat(Seat, ServerMsg),
}

struct DeliveryJob {
    session: SessionState,
    notifications: Vec<Notification>,
    done: oneshot::Sender<DeliveryReport>,
}

/// Handle to a queued fan-out.
#[derive(Debug)]
pub struct PendingDelivery(oneshot::Receiver<DeliveryReport>);

impl PendingDelivery {
    /// Wait for the fan-out to finish. A worker that died reports nothing delivered.
    pub async fn report(self) -> DeliveryReport {
        self.0.await.unwrap_or_default()
    }
}

pub struct Fanout {
    registry: Arc<ConnectionRegistry>,
    policy: RetryPolicy,
    /// One FIFO worker per session keeps notifications in commit order.
    queues: DashMap<String, mpsc::UnboundedSender<DeliveryJob>>,
}

impl Fanout {
    pub fn new(registry: Arc<ConnectionRegistry>, policy: RetryPolicy) -> Self {
        Self {
            registry,
            policy,
            queues: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Queue `notifications` behind earlier ones for the same session and
    /// return without waiting for delivery.
    pub fn enqueue(
        self: &Arc<Self>,
        session: SessionState,
        notifications: Vec<Notification>,
    ) -> PendingDelivery {
        let (done, rx) = oneshot::channel();
        let session_id = session.id.clone();
        let job = DeliveryJob {
            session,
            notifications,
            done,
        };

        let mut queue = self
            .queues
            .entry(session_id.clone())
            .or_insert_with(|| self.spawn_worker(&session_id));
        if let Err(mpsc::error::SendError(job)) = queue.send(job) {
            // The worker is gone; replace it.
            *queue = self.spawn_worker(&session_id);
            if queue.send(job).is_err() {
                warn!(session_id = %session_id, "delivery worker unavailable, dropping notifications");
            }
        }
        PendingDelivery(rx)
    }

    fn spawn_worker(self: &Arc<Self>, session_id: &str) -> mpsc::UnboundedSender<DeliveryJob> {
        let (tx, mut rx) = mpsc::unbounded_channel::<DeliveryJob>();
        let own = tx.clone();
        let fanout = Arc::clone(self);
        let session_id = session_id.to_owned();
        debug!(session_id = %session_id, "delivery worker started");

        tokio::spawn(async move {
            loop {
                match timeout(WORKER_IDLE, rx.recv()).await {
                    Ok(Some(job)) => fanout.run_job(job).await,
                    Ok(None) => break,
                    Err(_) => {
                        // Unhook first: senders only live in the map, so nothing
                        // new can arrive once the entry is gone.
                        fanout
                            .queues
                            .remove_if(&session_id, |_, tx| tx.same_channel(&own));
                        drop(own);
                        while let Ok(job) = rx.try_recv() {
                            fanout.run_job(job).await;
                        }
                        break;
                    }
                }
            }
            debug!(session_id = %session_id, "delivery worker stopped");
        });
        tx
    }

    async fn run_job(&self, job: DeliveryJob) {
        let report = self.dispatch(&job.session, &job.notifications).await;
        // The caller may have stopped waiting.
        let _ = job.done.send(report);
    }

    /// Deliver `notifications` in order. Each one reaches its recipients in parallel.
    pub async fn dispatch(
        &self,
        session: &SessionState,
        notifications: &[Notification],
    ) -> DeliveryReport {
        let mut total = DeliveryReport::default();
        for note in notifications {
            let report = match note {
                Notification::Broadcast(msg) => self.broadcast(&session.id, msg).await,
                Notification::Seat(seat, msg) => self.send_to_seat(session, *seat, msg).await,
            };
            total.delivered += report.delivered;
            total.failed += report.failed;
            total.deregistered += report.deregistered;
        }
        total
    }

    /// Send `msg` to every connection of the session.
    pub async fn broadcast(&self, session_id: &str, msg: &ServerMsg) -> DeliveryReport {
        let conns = self.registry.connections_for(session_id);
        self.deliver_all(conns, msg).await
    }

    /// Send `msg` to the connections of whoever sits at `seat`.
    pub async fn send_to_seat(
        &self,
        session: &SessionState,
        seat: Seat,
        msg: &ServerMsg,
    ) -> DeliveryReport {
        let Some(player) = session.player_at(seat) else {
            warn!(session_id = %session.id, seat, "no player at seat, dropping message");
            return DeliveryReport::default();
        };
        let conns = self
            .registry
            .connections_for_user(&session.id, &player.user_id);
        if conns.is_empty() {
            debug!(
                session_id = %session.id,
                seat,
                action = msg.action(),
                "seat has no live connection"
            );
        }
        self.deliver_all(conns, msg).await
    }

    async fn deliver_all(&self, conns: Vec<Connection>, msg: &ServerMsg) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        if conns.is_empty() {
            return report;
        }
        let payload = match msg.to_json() {
            Ok(p) => p,
            Err(err) => {
                warn!(error = %err, action = msg.action(), "dropping unserializable message");
                report.failed = conns.len();
                return report;
            }
        };

        let results = join_all(conns.iter().map(|c| self.deliver_one(c, &payload))).await;
        for (conn, result) in conns.iter().zip(results) {
            match result {
                Ok(()) => report.delivered += 1,
                Err(DeliveryError::RateLimited) => {
                    report.failed += 1;
                }
                Err(err) => {
                    // Gone, or still failing after every attempt.
                    report.failed += 1;
                    warn!(
                        session_id = %conn.session_id,
                        conn_id = %conn.conn_id,
                        error = %err,
                        action = msg.action(),
                        "delivery failed, deregistering connection"
                    );
                    if self.registry.deregister(&conn.session_id, conn.conn_id) {
                        report.deregistered += 1;
                    }
                }
            }
        }
        report
    }

    async fn deliver_one(&self, conn: &Connection, payload: &str) -> Result<(), DeliveryError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match conn.sink.deliver(payload).await {
                Ok(()) => return Ok(()),
                Err(err) if !err.is_retryable() || attempt >= max_attempts => return Err(err),
                Err(err) => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        conn_id = %conn.conn_id,
                        error = %err,
                        attempt,
                        retry_delay_ms = delay.as_millis() as u64,
                        "delivery failed, retrying"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
