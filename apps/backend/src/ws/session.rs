use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::jwt::verify_access_token;
use crate::state::app_state::AppState;
use crate::ws::protocol::{now_millis, ClientMsg, Inbound, ServerMsg};
use crate::ws::registry::{DeliveryError, MessageSink};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

/// Serialized notification pushed into a session actor's mailbox.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Outbound(pub String);

/// Registry sink backed by an actor mailbox.
pub struct ActorSink(Recipient<Outbound>);

#[async_trait]
impl MessageSink for ActorSink {
    async fn deliver(&self, payload: &str) -> Result<(), DeliveryError> {
        match self.0.try_send(Outbound(payload.to_owned())) {
            Ok(()) => Ok(()),
            Err(SendError::Closed(_)) => Err(DeliveryError::Gone),
            Err(SendError::Full(_)) => Err(DeliveryError::Transient("mailbox full".into())),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectQuery {
    pub session_id: String,
    pub token: String,
}

/// `GET /ws?sessionId=…&token=…`: verify identity, check the session exists, upgrade.
pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<ConnectQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let claims = verify_access_token(&query.token, &app_state.security)?;
    app_state.game_flow.session_snapshot(&query.session_id).await?;

    let session = WsSession::new(query.session_id.clone(), claims.sub, app_state);
    ws::start(session, &req, stream)
}

pub struct WsSession {
    conn_id: Option<Uuid>,
    session_id: String,
    user_id: String,
    app_state: web::Data<AppState>,
    last_heartbeat: Instant,
}

impl WsSession {
    fn new(session_id: String, user_id: String, app_state: web::Data<AppState>) -> Self {
        Self {
            conn_id: None,
            session_id,
            user_id,
            app_state,
            last_heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match msg.to_json() {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(
                    session_id = %actor.session_id,
                    user_id = %actor.user_id,
                    "[WS SESSION] heartbeat timed out"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn dispatch(&self, inbound: Inbound, ctx: &mut ws::WebsocketContext<Self>) {
        let flow = self.app_state.game_flow.clone();
        let session_id = self.session_id.clone();
        let user_id = self.user_id.clone();

        ctx.spawn(
            async move { flow.handle(&session_id, &user_id, inbound).await }
                .into_actor(self)
                .map(|res, actor, ctx| match res {
                    Ok(outcome) => {
                        if let Some(reply) = outcome.reply {
                            Self::send_json(ctx, &reply);
                        }
                    }
                    Err(err) => {
                        debug!(
                            session_id = %actor.session_id,
                            user_id = %actor.user_id,
                            code = %err.code(),
                            "[WS SESSION] action rejected"
                        );
                        Self::send_json(ctx, &ServerMsg::from(&err));
                    }
                }),
        );
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let registry = self.app_state.registry.clone();
        let sink = Arc::new(ActorSink(ctx.address().recipient::<Outbound>()));
        let conn = registry.register(&self.session_id, &self.user_id, sink);
        self.conn_id = Some(conn.conn_id);

        info!(
            conn_id = %conn.conn_id,
            session_id = %self.session_id,
            user_id = %self.user_id,
            "[WS SESSION] started"
        );

        // The registration expires; so does the socket.
        ctx.run_later(registry.ttl(), |actor, ctx| {
            info!(session_id = %actor.session_id, user_id = %actor.user_id, "[WS SESSION] expired");
            ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
            ctx.stop();
        });
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(conn_id) = self.conn_id.take() {
            self.app_state.registry.deregister(&self.session_id, conn_id);
        }
        info!(
            session_id = %self.session_id,
            user_id = %self.user_id,
            "[WS SESSION] stopped"
        );
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                match Inbound::parse(&text) {
                    Ok(Inbound {
                        msg: ClientMsg::Health,
                        ..
                    }) => Self::send_json(
                        ctx,
                        &ServerMsg::Health {
                            timestamp: now_millis(),
                        },
                    ),
                    Ok(inbound) => self.dispatch(inbound, ctx),
                    // Bad frames are answered, not fatal.
                    Err(err) => Self::send_json(ctx, &err.into_server_msg()),
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                Self::send_json(
                    ctx,
                    &ServerMsg::error(
                        crate::errors::ErrorCode::BadRequest,
                        "Binary frames are not supported",
                    ),
                );
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(
                    session_id = %self.session_id,
                    user_id = %self.user_id,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<Outbound> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) -> Self::Result {
        ctx.text(msg.0);
    }
}
