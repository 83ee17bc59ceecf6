//! API REST de l'état de lecture
//!
//! Routes (montées sous `/api`) :
//! - `GET /current-state`
//! - `POST /control/set-current`, `POST /control/play`, `POST /control/pause`
//! - `GET /sync/status`, `GET /sync/events` (SSE)
//!
//! Les commandes REST passent par le même hub que le WebSocket : l'état
//! retourné est aussi diffusé à tous les abonnés.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::{Error, HubStatus, PlaybackState, SyncHub, sse};

/// Réponse d'erreur
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Corps de `POST /control/set-current`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SelectRequest {
    #[schema(example = "intro-video")]
    pub id: String,
}

/// Corps optionnel de `POST /control/play` et `POST /control/pause`
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct TargetRequest {
    #[serde(default)]
    pub id: Option<String>,
}

pub(crate) fn hub_error(e: Error) -> Response {
    tracing::error!("Sync request failed: {}", e);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

fn state_response(result: crate::Result<PlaybackState>) -> Response {
    match result {
        Ok(state) => Json(state).into_response(),
        Err(e) => hub_error(e),
    }
}

/// État courant
#[utoipa::path(
    get,
    path = "/current-state",
    responses(
        (status = 200, description = "État de lecture", body = PlaybackState),
        (status = 503, description = "Hub arrêté", body = ErrorResponse)
    ),
    tag = "sync"
)]
pub async fn current_state(State(hub): State<SyncHub>) -> Response {
    state_response(hub.snapshot().await)
}

/// Sélectionne un asset (en pause)
#[utoipa::path(
    post,
    path = "/control/set-current",
    request_body = SelectRequest,
    responses(
        (status = 200, description = "Nouvel état diffusé", body = PlaybackState),
        (status = 503, description = "Hub arrêté", body = ErrorResponse)
    ),
    tag = "sync"
)]
pub async fn set_current(State(hub): State<SyncHub>, Json(body): Json<SelectRequest>) -> Response {
    state_response(hub.select_asset(body.id).await)
}

/// Lance la lecture de l'asset courant
#[utoipa::path(
    post,
    path = "/control/play",
    request_body(content = TargetRequest, description = "Facultatif : asset visé"),
    responses(
        (status = 200, description = "Nouvel état diffusé", body = PlaybackState),
        (status = 503, description = "Hub arrêté", body = ErrorResponse)
    ),
    tag = "sync"
)]
pub async fn play(State(hub): State<SyncHub>, body: Option<Json<TargetRequest>>) -> Response {
    let target = body.and_then(|Json(b)| b.id);
    state_response(hub.resume(target).await)
}

/// Met en pause l'asset courant
#[utoipa::path(
    post,
    path = "/control/pause",
    request_body(content = TargetRequest, description = "Facultatif : asset visé"),
    responses(
        (status = 200, description = "Nouvel état diffusé", body = PlaybackState),
        (status = 503, description = "Hub arrêté", body = ErrorResponse)
    ),
    tag = "sync"
)]
pub async fn pause(State(hub): State<SyncHub>, body: Option<Json<TargetRequest>>) -> Response {
    let target = body.and_then(|Json(b)| b.id);
    state_response(hub.pause_current(target).await)
}

/// Abonnés et compteurs du hub
#[utoipa::path(
    get,
    path = "/sync/status",
    responses(
        (status = 200, description = "Statut du hub", body = HubStatus),
        (status = 503, description = "Hub arrêté", body = ErrorResponse)
    ),
    tag = "sync"
)]
pub async fn sync_status(State(hub): State<SyncHub>) -> Response {
    match hub.status().await {
        Ok(status) => Json(status).into_response(),
        Err(e) => hub_error(e),
    }
}

/// Routeur de l'API de synchronisation, à monter sous `/api`
pub fn router(hub: SyncHub) -> Router {
    Router::new()
        .route("/current-state", get(current_state))
        .route("/control/set-current", post(set_current))
        .route("/control/play", post(play))
        .route("/control/pause", post(pause))
        .route("/sync/status", get(sync_status))
        .route("/sync/events", get(sse::sync_events))
        .with_state(hub)
}

#[derive(OpenApi)]
#[openapi(
    paths(current_state, set_current, play, pause, sync_status, sse::sync_events),
    components(schemas(PlaybackState, HubStatus, SelectRequest, TargetRequest, ErrorResponse)),
    tags(
        (name = "sync", description = "État de lecture partagé et commandes")
    ),
    info(
        title = "Panel Talk Sync API",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
