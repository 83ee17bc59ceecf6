//! # panelsync - Synchronisation de l'état de lecture
//!
//! Un unique [`PlaybackState`] (`{ currentAssetId, isPlaying }`) est détenu
//! par le [`SyncHub`]. Les contrôleurs envoient des commandes, le hub les
//! applique une par une et diffuse l'état complet à tous les abonnés ; un
//! nouvel abonné reçoit immédiatement l'état courant.
//!
//! ## Architecture
//!
//! - [`state`] : l'état et ses transitions
//! - [`hub`] : la tâche propriétaire de l'état et la diffusion
//! - [`protocol`] : trames WebSocket `{ event, data }`
//! - `ws`, `sse`, `api` : endpoints HTTP (feature `panelserver`)
//!
//! ## Exemple
//!
//! ```rust,no_run
//! use panelsync::{Role, SyncHub};
//!
//! # async fn example() -> panelsync::Result<()> {
//! let hub = SyncHub::spawn();
//! let mut display = hub.subscribe(Role::Display).await?;
//!
//! hub.select_asset("intro").await?;
//! hub.resume(None).await?;
//!
//! while let Some(state) = display.recv().await {
//!     println!("{:?}", state);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod hub;
pub mod protocol;
pub mod state;

#[cfg(feature = "panelserver")]
pub mod api;
#[cfg(feature = "panelserver")]
pub mod sse;
#[cfg(feature = "panelserver")]
pub mod ws;

#[cfg(feature = "panelserver")]
mod panelserver_impl;

pub use error::{Error, ProtocolError, Result};
pub use hub::{ConnectionId, DEFAULT_SEND_TIMEOUT, HubStatus, Subscription, SyncHub};
pub use protocol::{ClientEvent, Role, ServerEvent};
pub use state::{Mutation, PlaybackState};

/// Routeur autonome : `/socket` et l'API REST sous `/api`
#[cfg(feature = "panelserver")]
pub fn app(hub: SyncHub) -> axum::Router {
    axum::Router::new()
        .route("/socket", axum::routing::get(ws::socket_handler))
        .with_state(hub.clone())
        .nest("/api", api::router(hub))
}

/// Trait d'extension pour ajouter la synchronisation à panelserver
///
/// # Routes enregistrées
///
/// - `GET /socket?role=controller|display` - WebSocket
/// - `GET /api/current-state`, `POST /api/control/{set-current,play,pause}`
/// - `GET /api/sync/status`, `GET /api/sync/events` (SSE)
/// - `GET /swagger-ui/sync` - Documentation interactive
#[cfg(feature = "panelserver")]
#[async_trait::async_trait]
pub trait SyncServerExt {
    /// Démarre un hub et enregistre ses routes
    async fn init_sync_api(&mut self) -> anyhow::Result<SyncHub>;

    /// Enregistre les routes d'un hub existant
    async fn attach_sync_hub(&mut self, hub: SyncHub) -> anyhow::Result<()>;
}
