//! Connexion au serveur Panel Talk
//!
//! La façade tient une tâche de fond qui enchaîne :
//! `Connecting` (catalogue via `GET /api/assets`, WebSocket `/socket`,
//! premier `server:state`) → `Synchronized` → `Disconnected` à la première
//! erreur de transport, puis nouvelle tentative après `reconnect_delay`.
//! Chaque tentative refait la séquence complète, catalogue compris.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use futures::{SinkExt, Stream, StreamExt};
use panelcatalog::AssetCatalog;
use panelconfig::get_config;
use panelsync::{ClientEvent, PlaybackState, Role, ServerEvent};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{sleep, timeout},
};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    CatalogView, ConnectionStatus, Error, FacadeView, Result, settings::normalize_server_url,
};

/// Paramètres de connexion
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: Url,
    pub role: Role,
    pub connect_timeout: Duration,
    pub reconnect_delay: Duration,
    /// Préfixe sous lequel le serveur expose les fichiers média
    pub asset_url_prefix: String,
}

impl ClientConfig {
    pub fn new(server_url: Url, role: Role) -> Self {
        Self {
            server_url,
            role,
            connect_timeout: Duration::from_secs(5),
            reconnect_delay: Duration::from_secs(2),
            asset_url_prefix: "/assets".to_string(),
        }
    }

    /// Lit la section `client` de la configuration globale
    pub fn from_config(role: Role) -> Result<Self> {
        let config = get_config();
        let server_url = normalize_server_url(&config.get_client_server_url())?;
        Ok(Self {
            server_url,
            role,
            connect_timeout: config.get_client_connect_timeout(),
            reconnect_delay: config.get_client_reconnect_delay(),
            asset_url_prefix: config.get_asset_url_prefix(),
        })
    }

    pub fn with_timeouts(mut self, connect_timeout: Duration, reconnect_delay: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self.reconnect_delay = reconnect_delay;
        self
    }

    /// Racine absolue des fichiers média (`http://host:3001/assets`)
    pub fn asset_root(&self) -> String {
        format!(
            "{}/{}",
            self.server_url.as_str().trim_end_matches('/'),
            self.asset_url_prefix.trim_matches('/')
        )
    }

    fn check_scheme(&self) -> Result<()> {
        match self.server_url.scheme() {
            "http" => Ok(()),
            other => Err(Error::UnsupportedScheme(other.to_string())),
        }
    }

    fn catalog_url(&self) -> Result<Url> {
        self.check_scheme()?;
        self.server_url
            .join("/api/assets")
            .map_err(|_| Error::InvalidServerUrl(self.server_url.to_string()))
    }

    fn socket_url(&self) -> Result<Url> {
        self.check_scheme()?;
        let mut url = self.server_url.clone();
        url.set_scheme("ws")
            .map_err(|_| Error::InvalidServerUrl(self.server_url.to_string()))?;
        url.set_path("/socket");
        url.query_pairs_mut()
            .clear()
            .append_pair("role", self.role.as_str());
        Ok(url)
    }
}

/// État partagé entre la façade et sa tâche de connexion
struct Shared {
    view: watch::Sender<FacadeView>,
    outbound: Mutex<Option<mpsc::UnboundedSender<ClientEvent>>>,
}

impl Shared {
    fn set_outbound(&self, tx: Option<mpsc::UnboundedSender<ClientEvent>>) {
        match self.outbound.lock() {
            Ok(mut outbound) => *outbound = tx,
            Err(poisoned) => *poisoned.into_inner() = tx,
        }
    }

    fn connecting(&self) {
        self.view
            .send_modify(|v| v.status = ConnectionStatus::Connecting);
    }

    fn set_catalog(&self, catalog: CatalogView) {
        self.view.send_modify(|v| v.catalog = catalog);
    }

    fn synchronized(&self, state: PlaybackState, tx: mpsc::UnboundedSender<ClientEvent>) {
        self.set_outbound(Some(tx));
        self.view.send_modify(|v| {
            v.status = ConnectionStatus::Synchronized;
            v.state = state;
        });
    }

    fn update_state(&self, state: PlaybackState) {
        self.view.send_modify(|v| v.state = state);
    }

    fn disconnected(&self) {
        self.set_outbound(None);
        self.view
            .send_modify(|v| v.status = ConnectionStatus::Disconnected);
    }
}

/// Client synchronisé avec le serveur
///
/// Libérer la façade arrête la tâche de connexion.
pub struct ClientFacade {
    config: ClientConfig,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ClientFacade {
    /// Lance la connexion (et les reconnexions) en tâche de fond
    pub fn start(config: ClientConfig) -> Self {
        let (view, _) = watch::channel(FacadeView::default());
        let shared = Arc::new(Shared {
            view,
            outbound: Mutex::new(None),
        });
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run(config.clone(), shared.clone(), cancel.clone()));

        Self {
            config,
            shared,
            cancel,
            task: Some(task),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Dernière vue publiée
    pub fn view(&self) -> FacadeView {
        self.shared.view.borrow().clone()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.shared.view.borrow().status
    }

    /// Flux des vues successives
    pub fn subscribe(&self) -> watch::Receiver<FacadeView> {
        self.shared.view.subscribe()
    }

    /// Attend une vue satisfaisant `predicate`
    pub async fn wait_until(
        &self,
        within: Duration,
        mut predicate: impl FnMut(&FacadeView) -> bool,
    ) -> Result<FacadeView> {
        let mut rx = self.subscribe();
        match timeout(within, rx.wait_for(|v| predicate(v))).await {
            Ok(Ok(view)) => Ok(view.clone()),
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => Err(Error::Timeout(within)),
        }
    }

    pub async fn wait_for_status(
        &self,
        status: ConnectionStatus,
        within: Duration,
    ) -> Result<FacadeView> {
        self.wait_until(within, |v| v.status == status).await
    }

    fn send(&self, event: ClientEvent) -> Result<()> {
        if !self.status().is_connected() {
            return Err(Error::NotConnected);
        }
        let outbound = self.shared.outbound.lock().map_err(|_| Error::NotConnected)?;
        match outbound.as_ref() {
            Some(tx) => tx.send(event).map_err(|_| Error::NotConnected),
            None => Err(Error::NotConnected),
        }
    }

    /// `controller:set-current`
    pub fn select(&self, id: impl Into<String>) -> Result<()> {
        self.send(ClientEvent::SetCurrent { id: id.into() })
    }

    /// `controller:play`
    pub fn play(&self, target: Option<String>) -> Result<()> {
        self.send(ClientEvent::Play { id: target })
    }

    /// `controller:pause`
    pub fn pause(&self, target: Option<String>) -> Result<()> {
        self.send(ClientEvent::Pause { id: target })
    }

    /// Arrête la tâche de connexion et attend sa fin
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ClientFacade {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(config: ClientConfig, shared: Arc<Shared>, cancel: CancellationToken) {
    let http = reqwest::Client::builder()
        .timeout(config.connect_timeout)
        .build()
        .unwrap_or_default();

    loop {
        shared.connecting();
        info!("Connecting to {} as {}", config.server_url, config.role);

        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = session(&config, &http, &shared) => result,
        };

        shared.disconnected();
        match result {
            Ok(()) => info!("Connection to {} ended", config.server_url),
            // Réessayer ne changera rien
            Err(e @ Error::UnsupportedScheme(_)) => {
                error!("Cannot connect to {}: {}", config.server_url, e);
                break;
            }
            Err(e) => warn!("Connection to {} lost: {}", config.server_url, e),
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(config.reconnect_delay) => {}
        }
    }

    shared.disconnected();
    debug!("Client connection task stopped");
}

async fn fetch_catalog(http: &reqwest::Client, config: &ClientConfig) -> Result<AssetCatalog> {
    let response = http
        .get(config.catalog_url()?)
        .send()
        .await?
        .error_for_status()?;
    let body = response.text().await?;
    Ok(AssetCatalog::from_json(&body)?)
}

/// Une connexion complète, jusqu'à sa perte
async fn session(config: &ClientConfig, http: &reqwest::Client, shared: &Shared) -> Result<()> {
    let catalog = match fetch_catalog(http, config).await {
        Ok(catalog) => {
            info!("📚 Catalog received ({} assets)", catalog.len());
            CatalogView::Ready(Arc::new(catalog))
        }
        Err(e) => {
            warn!("Catalog unavailable: {}", e);
            CatalogView::Unavailable(e.to_string())
        }
    };
    shared.set_catalog(catalog);

    let url = config.socket_url()?;
    let (socket, _) = timeout(config.connect_timeout, connect_async(url.as_str()))
        .await
        .map_err(|_| Error::Timeout(config.connect_timeout))??;
    let (mut write, mut read) = socket.split();

    if config.role == Role::Display {
        write
            .send(Message::text(ClientEvent::DisplayReady.encode()))
            .await?;
    }

    let first = timeout(config.connect_timeout, next_state(&mut read))
        .await
        .map_err(|_| Error::Timeout(config.connect_timeout))??;

    let (tx, mut rx) = mpsc::unbounded_channel();
    shared.synchronized(first, tx);
    info!("🔗 Synchronized with {}", config.server_url);

    loop {
        tokio::select! {
            Some(event) = rx.recv() => {
                write.send(Message::text(event.encode())).await?;
            }
            event = next_event(&mut read) => match event? {
                ServerEvent::State(state) => shared.update_state(state),
                ServerEvent::Error { message } => warn!("Server refused a command: {}", message),
            }
        }
    }
}

/// Prochain évènement serveur ; les trames illisibles sont ignorées
async fn next_event<S>(read: &mut S) -> Result<ServerEvent>
where
    S: Stream<Item = std::result::Result<Message, tokio_tungstenite::tungstenite::Error>>
        + Unpin
        + ?Sized,
{
    loop {
        let message = match read.next().await {
            Some(message) => message?,
            None => return Err(Error::ConnectionClosed),
        };
        match message {
            Message::Text(text) => match ServerEvent::parse(text.as_str()) {
                Ok(event) => return Ok(event),
                Err(e) => warn!("Ignoring server frame: {}", e),
            },
            Message::Close(_) => return Err(Error::ConnectionClosed),
            _ => {}
        }
    }
}

async fn next_state<S>(read: &mut S) -> Result<PlaybackState>
where
    S: Stream<Item = std::result::Result<Message, tokio_tungstenite::tungstenite::Error>>
        + Unpin
        + ?Sized,
{
    loop {
        match next_event(read).await? {
            ServerEvent::State(state) => return Ok(state),
            ServerEvent::Error { message } => warn!("Server error while connecting: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str, role: Role) -> ClientConfig {
        ClientConfig::new(Url::parse(url).unwrap(), role)
    }

    #[test]
    fn test_derived_urls() {
        let c = config("http://10.0.0.2:3001/", Role::Display);
        assert_eq!(c.catalog_url().unwrap().as_str(), "http://10.0.0.2:3001/api/assets");
        assert_eq!(
            c.socket_url().unwrap().as_str(),
            "ws://10.0.0.2:3001/socket?role=display"
        );
        assert_eq!(c.asset_root(), "http://10.0.0.2:3001/assets");

        let c = config("https://panel.example.com:3001/", Role::Controller);
        assert!(matches!(c.catalog_url(), Err(Error::UnsupportedScheme(_))));
        assert!(matches!(c.socket_url(), Err(Error::UnsupportedScheme(_))));
    }

    #[tokio::test]
    async fn test_https_server_is_not_retried() {
        let facade = ClientFacade::start(
            config("https://127.0.0.1:9/", Role::Display)
                .with_timeouts(Duration::from_millis(200), Duration::from_millis(10)),
        );
        let view = facade
            .wait_until(Duration::from_secs(2), |v| {
                matches!(v.catalog, CatalogView::Unavailable(_))
            })
            .await
            .unwrap();
        assert!(matches!(&view.catalog, CatalogView::Unavailable(reason) if reason.contains("https")));

        // La tâche s'arrête d'elle-même au lieu de boucler
        let mut facade = facade;
        let task = facade.task.take().unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(facade.status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_commands_fail_until_synchronized() {
        // Port réservé puis libéré : personne n'écoute
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let facade = ClientFacade::start(
            config(&format!("http://127.0.0.1:{}/", port), Role::Controller)
                .with_timeouts(Duration::from_millis(200), Duration::from_millis(50)),
        );
        assert!(matches!(facade.select("a"), Err(Error::NotConnected)));
        assert!(matches!(facade.play(None), Err(Error::NotConnected)));

        let view = facade
            .wait_until(Duration::from_secs(2), |v| {
                matches!(v.catalog, CatalogView::Unavailable(_))
            })
            .await
            .unwrap();
        assert_ne!(view.status, ConnectionStatus::Synchronized);
        facade.shutdown().await;
    }
}
