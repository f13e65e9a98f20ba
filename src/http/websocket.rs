//! Event feed over WebSocket.
//!
//! # Responsibilities
//! - Upgrade feed requests to WebSocket
//! - Subscribe the connection to the broadcaster (catch-up snapshot first)
//! - Write queued events as JSON text frames
//! - Send keep-alive pings and watch the read side for disconnects
//!
//! # Data Flow
//! ```text
//! Broadcaster ── per-observer queue ──→ observer task ── text frames ──→ Client
//!                                           ↑ ping every keepalive_secs
//!                                           ↑ close / read error → unsubscribe
//! ```
//!
//! # Design Decisions
//! - One task per observer; writes and pings share its single sink
//! - Every write carries a deadline
//! - All exits (write failure, ping failure, read failure, dropped by the
//!   broadcaster, shutdown) funnel into one `unsubscribe`

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use std::time::Duration;
use tokio::time::{self, Instant};

use crate::events::Subscription;
use crate::http::server::AppState;

/// Upgrade handler for the event feed.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| observe(socket, state))
}

async fn observe(socket: WebSocket, state: AppState) {
    let Subscription { id, mut receiver } = state.events.subscribe(&state.pool);
    let mut shutdown = state.shutdown.subscribe();
    let (mut sink, mut stream) = socket.split();

    let send_timeout = Duration::from_secs(state.config.events.send_timeout_secs);
    let period = Duration::from_secs(state.config.events.keepalive_secs);
    let mut keepalive = time::interval_at(Instant::now() + period, period);

    tracing::info!(observer = %id, "Observer connected");

    let reason = loop {
        tokio::select! {
            payload = receiver.recv() => match payload {
                Some(payload) => {
                    if let Err(reason) = send(&mut sink, Message::Text((&*payload).into()), send_timeout).await {
                        break reason;
                    }
                }
                None => break "dropped by broadcaster",
            },
            _ = keepalive.tick() => {
                if let Err(reason) = send(&mut sink, Message::Ping(Bytes::new()), send_timeout).await {
                    break reason;
                }
            }
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break "closed by client",
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(observer = %id, error = %e, "Observer read error");
                    break "read error";
                }
            },
            _ = shutdown.recv() => {
                let _ = send(&mut sink, Message::Close(None), send_timeout).await;
                break "shutdown";
            }
        }
    };

    state.events.unsubscribe(id);
    tracing::info!(observer = %id, reason, "Observer disconnected");
}

async fn send(
    sink: &mut SplitSink<WebSocket, Message>,
    message: Message,
    timeout: Duration,
) -> Result<(), &'static str> {
    match time::timeout(timeout, sink.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "Observer write failed");
            Err("write failed")
        }
        Err(_) => Err("write timed out"),
    }
}
