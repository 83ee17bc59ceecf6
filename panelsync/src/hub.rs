//! Hub de synchronisation
//!
//! Le hub est une tâche tokio propriétaire exclusive du [`PlaybackState`].
//! Toutes les requêtes passent par une file unique et sont traitées une à
//! une : une commande est appliquée puis diffusée avant que la suivante ne
//! soit lue. Chaque abonné reçoit les états dans le même ordre, via sa
//! propre file ; un abonné fermé est retiré sans gêner les autres.

use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::{Error, Mutation, PlaybackState, Result, Role};

/// Délai accordé à un envoi vers un client avant de le déconnecter
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Identifiant d'une connexion abonnée
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Vue d'ensemble du hub
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct HubStatus {
    pub state: PlaybackState,
    pub controllers: usize,
    pub displays: usize,
    /// Nombre de commandes appliquées depuis le démarrage
    pub commands_applied: u64,
    pub last_change: Option<DateTime<Utc>>,
}

enum Request {
    Apply {
        mutation: Mutation,
        reply: oneshot::Sender<PlaybackState>,
    },
    Subscribe {
        role: Role,
        reply: oneshot::Sender<(ConnectionId, PlaybackState, mpsc::UnboundedReceiver<PlaybackState>)>,
    },
    Resync {
        id: ConnectionId,
    },
    Unsubscribe {
        id: ConnectionId,
    },
    Snapshot {
        reply: oneshot::Sender<PlaybackState>,
    },
    Status {
        reply: oneshot::Sender<HubStatus>,
    },
}

struct Subscriber {
    id: ConnectionId,
    role: Role,
    tx: mpsc::UnboundedSender<PlaybackState>,
}

/// État interne de la tâche hub
#[derive(Default)]
struct HubCore {
    state: PlaybackState,
    subscribers: Vec<Subscriber>,
    commands_applied: u64,
    last_change: Option<DateTime<Utc>>,
}

impl HubCore {
    fn handle(&mut self, request: Request) {
        match request {
            Request::Apply { mutation, reply } => {
                let state = self.apply(mutation);
                let _ = reply.send(state);
            }
            Request::Subscribe { role, reply } => {
                let (tx, rx) = mpsc::unbounded_channel();
                let id = ConnectionId::new();
                if reply.send((id, self.state.clone(), rx)).is_ok() {
                    self.subscribers.push(Subscriber { id, role, tx });
                    debug!(connection = %id, role = %role, "subscriber registered");
                }
            }
            Request::Resync { id } => {
                let state = self.state.clone();
                self.subscribers
                    .retain(|s| s.id != id || s.tx.send(state.clone()).is_ok());
            }
            Request::Unsubscribe { id } => {
                self.subscribers.retain(|s| s.id != id);
                debug!(connection = %id, "subscriber removed");
            }
            Request::Snapshot { reply } => {
                let _ = reply.send(self.state.clone());
            }
            Request::Status { reply } => {
                let _ = reply.send(self.status());
            }
        }
    }

    fn apply(&mut self, mutation: Mutation) -> PlaybackState {
        if self.state.is_mismatch(mutation.target()) {
            warn!(
                "Command targets '{}' but current asset is {:?}, applying anyway",
                mutation.target().unwrap_or_default(),
                self.state.current_asset_id
            );
        }

        self.state.apply(&mutation);
        self.commands_applied += 1;
        self.last_change = Some(Utc::now());
        info!(
            "State -> current={:?} playing={}",
            self.state.current_asset_id, self.state.is_playing
        );

        let state = self.state.clone();
        self.subscribers
            .retain(|s| s.tx.send(state.clone()).is_ok());
        state
    }

    fn status(&self) -> HubStatus {
        let count = |role: Role| self.subscribers.iter().filter(|s| s.role == role).count();
        HubStatus {
            state: self.state.clone(),
            controllers: count(Role::Controller),
            displays: count(Role::Display),
            commands_applied: self.commands_applied,
            last_change: self.last_change,
        }
    }
}

/// Poignée vers le hub, clonable à volonté
#[derive(Clone)]
pub struct SyncHub {
    inbox: mpsc::UnboundedSender<Request>,
    send_timeout: Duration,
}

impl SyncHub {
    /// Démarre la tâche hub sur le runtime courant
    ///
    /// La tâche s'arrête quand toutes les poignées et tous les abonnements
    /// ont été libérés.
    pub fn spawn() -> Self {
        let (inbox, mut rx) = mpsc::unbounded_channel::<Request>();
        tokio::spawn(async move {
            let mut core = HubCore::default();
            while let Some(request) = rx.recv().await {
                core.handle(request);
            }
            debug!("Sync hub stopped");
        });
        Self {
            inbox,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Change le délai d'envoi des connexions servies par cette poignée
    ///
    /// Un client qui ne lit plus sa socket est déconnecté passé ce délai,
    /// ce qui libère sa file d'états.
    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    fn send(&self, request: Request) -> Result<()> {
        self.inbox.send(request).map_err(|_| Error::HubClosed)
    }

    async fn ask<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Request) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.send(make(reply))?;
        rx.await.map_err(|_| Error::HubClosed)
    }

    /// Applique une commande et retourne l'état diffusé
    pub async fn apply(&self, mutation: Mutation) -> Result<PlaybackState> {
        self.ask(|reply| Request::Apply { mutation, reply }).await
    }

    /// Sélectionne un asset (sans vérification du catalogue), en pause
    pub async fn select_asset(&self, id: impl Into<String>) -> Result<PlaybackState> {
        self.apply(Mutation::Select(id.into())).await
    }

    /// Lance la lecture de l'asset courant
    ///
    /// `target` est informatif : un désaccord avec l'asset courant est
    /// journalisé mais la commande est appliquée.
    pub async fn resume(&self, target: Option<String>) -> Result<PlaybackState> {
        self.apply(Mutation::Resume(target)).await
    }

    /// Met en pause l'asset courant
    pub async fn pause_current(&self, target: Option<String>) -> Result<PlaybackState> {
        self.apply(Mutation::Pause(target)).await
    }

    /// Inscrit un abonné
    ///
    /// L'instantané retourné et l'inscription sont atomiques : aucune
    /// diffusion ne peut se glisser entre les deux.
    pub async fn subscribe(&self, role: Role) -> Result<Subscription> {
        let (id, snapshot, updates) = self.ask(|reply| Request::Subscribe { role, reply }).await?;
        Ok(Subscription {
            id,
            role,
            snapshot,
            updates,
            inbox: self.inbox.clone(),
        })
    }

    /// Renvoie l'état courant à un seul abonné, dans sa file
    pub fn resync(&self, id: ConnectionId) -> Result<()> {
        self.send(Request::Resync { id })
    }

    pub fn unsubscribe(&self, id: ConnectionId) -> Result<()> {
        self.send(Request::Unsubscribe { id })
    }

    pub async fn snapshot(&self) -> Result<PlaybackState> {
        self.ask(|reply| Request::Snapshot { reply }).await
    }

    pub async fn status(&self) -> Result<HubStatus> {
        self.ask(|reply| Request::Status { reply }).await
    }
}

/// Abonnement aux états diffusés
///
/// Libérer l'abonnement désinscrit la connexion.
pub struct Subscription {
    id: ConnectionId,
    role: Role,
    snapshot: PlaybackState,
    updates: mpsc::UnboundedReceiver<PlaybackState>,
    inbox: mpsc::UnboundedSender<Request>,
}

impl Subscription {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// État au moment de l'inscription
    pub fn snapshot(&self) -> &PlaybackState {
        &self.snapshot
    }

    /// Prochain état diffusé, `None` si le hub s'est arrêté
    pub async fn recv(&mut self) -> Option<PlaybackState> {
        self.updates.recv().await
    }

    /// Demande un nouvel instantané (`display:ready`)
    pub fn resync(&self) -> Result<()> {
        self.inbox
            .send(Request::Resync { id: self.id })
            .map_err(|_| Error::HubClosed)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let _ = self.inbox.send(Request::Unsubscribe { id: self.id });
    }
}
