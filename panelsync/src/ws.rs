//! Endpoint WebSocket `GET /socket?role=controller|display`
//!
//! Chaque connexion est servie par sa propre tâche : l'instantané initial
//! est envoyé d'abord, puis la tâche relaie les états diffusés et traite les
//! trames entrantes. Une erreur d'E/S ne termine que cette connexion, de même
//! qu'un envoi bloqué plus longtemps que [`SyncHub::send_timeout`].

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use std::time::Duration;

use futures::{SinkExt, StreamExt, stream::SplitSink};
use serde::Deserialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{ClientEvent, Result, Role, ServerEvent, Subscription, SyncHub};

#[derive(Debug, Default, Deserialize)]
pub struct SocketParams {
    #[serde(default)]
    pub role: Role,
}

pub async fn socket_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<SocketParams>,
    State(hub): State<SyncHub>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, hub, params.role))
}

/// Erreur d'envoi ou délai dépassé (client qui ne lit plus)
async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
    within: Duration,
) -> std::result::Result<(), String> {
    match timeout(within, sender.send(Message::Text(event.encode().into()))).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(_) => Err(format!("no progress within {:?}", within)),
    }
}

async fn handle_socket(socket: WebSocket, hub: SyncHub, role: Role) {
    let mut subscription = match hub.subscribe(role).await {
        Ok(subscription) => subscription,
        Err(e) => {
            warn!("Cannot subscribe new {} connection: {}", role, e);
            return;
        }
    };
    let id = subscription.id();
    let send_timeout = hub.send_timeout();
    info!(connection = %id, role = %role, "🔌 Client connected");

    let (mut sender, mut receiver) = socket.split();

    let snapshot = ServerEvent::State(subscription.snapshot().clone());
    if send_event(&mut sender, &snapshot, send_timeout).await.is_err() {
        debug!(connection = %id, "Client left before the initial snapshot");
        return;
    }

    loop {
        tokio::select! {
            update = subscription.recv() => {
                let Some(state) = update else { break };
                let event = ServerEvent::State(state);
                if let Err(e) = send_event(&mut sender, &event, send_timeout).await {
                    warn!(connection = %id, "Dropping client, send failed: {}", e);
                    break;
                }
            }
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if let Err(e) = handle_frame(&hub, &subscription, text.as_str()).await {
                        warn!(connection = %id, "Rejected frame: {}", e);
                        let reply = ServerEvent::error(e.to_string());
                        if send_event(&mut sender, &reply, send_timeout).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(connection = %id, "Receive failed: {}", e);
                    break;
                }
            }
        }
    }

    info!(connection = %id, role = %role, "Client disconnected");
}

async fn handle_frame(hub: &SyncHub, subscription: &Subscription, text: &str) -> Result<()> {
    let event = ClientEvent::parse(text)?;
    subscription.role().authorize(&event)?;

    match event.mutation() {
        Some(mutation) => {
            hub.apply(mutation).await?;
        }
        None => {
            debug!(connection = %subscription.id(), "Display ready, sending snapshot");
            subscription.resync()?;
        }
    }
    Ok(())
}
