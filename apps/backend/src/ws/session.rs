use std::collections::HashMap;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use futures_util::StreamExt as _;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::app_state::AppState;
use crate::ws::protocol::{ClientMsg, ErrorCode, EventEnvelope, ServerMsg, Topic, PROTOCOL_VERSION};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let conn_id = Uuid::new_v4();
    let session = WsSession::new(conn_id, app_state);
    ws::start(session, &req, stream)
}

/// One hub event tagged with the topic whose stream produced it.
pub struct TopicEvent {
    topic: Topic,
    item: Result<EventEnvelope, BroadcastStreamRecvError>,
}

pub struct WsSession {
    conn_id: Uuid,
    app_state: web::Data<AppState>,

    /// One bridged hub stream per subscribed topic.
    subscriptions: HashMap<Topic, SpawnHandle>,

    last_heartbeat: Instant,
    hello_done: bool,
}

impl WsSession {
    fn new(conn_id: Uuid, app_state: web::Data<AppState>) -> Self {
        Self {
            conn_id,
            app_state,
            subscriptions: HashMap::new(),
            last_heartbeat: Instant::now(),
            hello_done: false,
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error_and_close(
        &self,
        ctx: &mut ws::WebsocketContext<Self>,
        code: ErrorCode,
        message: impl Into<String>,
    ) {
        let msg = ServerMsg::Error {
            code,
            message: message.into(),
        };
        Self::send_json(ctx, &msg);
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
        ctx.stop();
    }

    fn start_heartbeat(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = %actor.conn_id, "[WS SESSION] heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn handle_subscribe(&mut self, topic: Topic, ctx: &mut ws::WebsocketContext<Self>) {
        if self.subscriptions.contains_key(&topic) {
            Self::send_json(
                ctx,
                &ServerMsg::Ack {
                    message: "subscribed",
                },
            );
            return;
        }

        let hub = self.app_state.hub();
        let rx = hub.subscribe(&topic);
        let snapshot = hub.presence_snapshot(&topic);

        // Ordering guarantee: ack, then presence snapshot, then the stream.
        Self::send_json(
            ctx,
            &ServerMsg::Ack {
                message: "subscribed",
            },
        );
        Self::send_json(
            ctx,
            &ServerMsg::Presence {
                topic: topic.clone(),
                participants: snapshot,
            },
        );

        let stream_topic = topic.clone();
        let handle = ctx.add_stream(BroadcastStream::new(rx).map(move |item| TopicEvent {
            topic: stream_topic.clone(),
            item,
        }));
        self.subscriptions.insert(topic, handle);
    }

    fn handle_unsubscribe(&mut self, topic: &Topic, ctx: &mut ws::WebsocketContext<Self>) {
        if let Some(handle) = self.subscriptions.remove(topic) {
            ctx.cancel_future(handle);
        }
        Self::send_json(
            ctx,
            &ServerMsg::Ack {
                message: "unsubscribed",
            },
        );
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "[WS SESSION] started");
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "[WS SESSION] stopped");
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

                let parsed: Result<ClientMsg, _> = serde_json::from_str(&text);
                let Ok(cmd) = parsed else {
                    self.send_error_and_close(ctx, ErrorCode::BadRequest, "Malformed JSON");
                    return;
                };

                match cmd {
                    ClientMsg::Hello { protocol } => {
                        if protocol != PROTOCOL_VERSION {
                            self.send_error_and_close(
                                ctx,
                                ErrorCode::BadProtocol,
                                "Unsupported protocol version",
                            );
                            return;
                        }
                        self.hello_done = true;
                        Self::send_json(
                            ctx,
                            &ServerMsg::HelloAck {
                                protocol: PROTOCOL_VERSION,
                            },
                        );
                    }
                    ClientMsg::Subscribe { topic } => {
                        if !self.hello_done {
                            self.send_error_and_close(
                                ctx,
                                ErrorCode::BadRequest,
                                "Must send hello first",
                            );
                            return;
                        }
                        self.handle_subscribe(topic, ctx);
                    }
                    ClientMsg::Unsubscribe { topic } => {
                        if !self.hello_done {
                            self.send_error_and_close(
                                ctx,
                                ErrorCode::BadRequest,
                                "Must send hello first",
                            );
                            return;
                        }
                        self.handle_unsubscribe(&topic, ctx);
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                self.send_error_and_close(ctx, ErrorCode::BadRequest, "Binary not supported");
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
                    conn_id = %self.conn_id,
                    error = %err,
                    "[WS SESSION] protocol error"
                );
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl StreamHandler<TopicEvent> for WsSession {
    fn handle(&mut self, msg: TopicEvent, ctx: &mut Self::Context) {
        match msg.item {
            Ok(event) => {
                Self::send_json(
                    ctx,
                    &ServerMsg::Event {
                        topic: msg.topic,
                        event,
                    },
                );
            }
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                // Keep the socket alive; the client resyncs over HTTP.
                warn!(
                    conn_id = %self.conn_id,
                    topic = ?msg.topic,
                    missed,
                    "[WS SESSION] subscriber lagged"
                );
                Self::send_json(
                    ctx,
                    &ServerMsg::Error {
                        code: ErrorCode::Lagged,
                        message: format!("missed {missed} events, refetch state"),
                    },
                );
            }
        }
    }

    // A retired topic ends its stream; that never ends the connection.
    fn finished(&mut self, _ctx: &mut Self::Context) {}
}
