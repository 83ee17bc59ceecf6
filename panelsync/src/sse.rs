//! Flux SSE des états diffusés
//!
//! Route : `GET /api/sync/events`. L'état courant est envoyé d'abord, puis
//! chaque état diffusé, sous le nom d'évènement `server:state`. Le flux
//! compte comme un abonné en lecture seule.

use async_stream::stream;
use axum::{
    extract::State,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};

use crate::{PlaybackState, Role, SyncHub, api::hub_error, protocol::SERVER_STATE};

fn state_event(state: &PlaybackState) -> Event {
    match Event::default().event(SERVER_STATE).json_data(state) {
        Ok(event) => event,
        Err(e) => Event::default().event("error").data(e.to_string()),
    }
}

/// Flux des états
#[utoipa::path(
    get,
    path = "/sync/events",
    responses(
        (status = 200, description = "Flux SSE d'évènements server:state", content_type = "text/event-stream"),
        (status = 503, description = "Hub arrêté")
    ),
    tag = "sync"
)]
pub async fn sync_events(State(hub): State<SyncHub>) -> Response {
    let mut subscription = match hub.subscribe(Role::Display).await {
        Ok(subscription) => subscription,
        Err(e) => return hub_error(e),
    };

    let stream = stream! {
        yield Ok::<_, std::convert::Infallible>(state_event(subscription.snapshot()));
        while let Some(state) = subscription.recv().await {
            yield Ok(state_event(&state));
        }
    };

    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}
