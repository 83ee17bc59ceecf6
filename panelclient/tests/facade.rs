use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
    routing::get,
};
use panelcatalog::{AssetCatalog, CatalogProvider};
use panelclient::{
    CatalogView, ClientConfig, ClientFacade, ConnectionStatus, ControllerClient, DisplayClient,
    DisplayDirective, Error,
};
use panelorder::MemoryStore;
use panelsync::{PlaybackState, Role, ServerEvent, SyncHub};
use tokio::{net::TcpListener, sync::Notify};
use url::Url;

const WAIT: Duration = Duration::from_secs(3);

const CATALOG: &str = r#"{ "playlist": [
    { "id": "logo", "type": "image", "title": "Logo", "filename": "logo.png" },
    { "id": "intro", "type": "video", "title": "Intro", "filename": "intro.mp4", "duration": 95 },
    { "id": "talk", "type": "youtube", "title": "Talk", "videoId": "dQw4w9WgXcQ" }
] }"#;

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Serveur complet : synchronisation + catalogue
async fn start_server(provider: CatalogProvider) -> (SocketAddr, SyncHub) {
    let hub = SyncHub::spawn();
    let api = panelsync::api::router(hub.clone()).merge(panelcatalog::api::router(Arc::new(provider)));
    let router = Router::new()
        .route("/socket", get(panelsync::ws::socket_handler))
        .with_state(hub.clone())
        .nest("/api", api);
    (serve(router).await, hub)
}

fn config(addr: SocketAddr, role: Role) -> ClientConfig {
    let url = Url::parse(&format!("http://{}/", addr)).unwrap();
    ClientConfig::new(url, role).with_timeouts(Duration::from_millis(500), Duration::from_millis(100))
}

fn catalog() -> CatalogProvider {
    CatalogProvider::from_catalog(AssetCatalog::from_json(CATALOG).unwrap())
}

#[tokio::test]
async fn test_reaches_synchronized_with_catalog_and_snapshot() {
    let (addr, hub) = start_server(catalog()).await;
    hub.select_asset("intro").await.unwrap();

    let facade = ClientFacade::start(config(addr, Role::Display));
    let view = facade
        .wait_for_status(ConnectionStatus::Synchronized, WAIT)
        .await
        .unwrap();

    assert_eq!(view.catalog.catalog().unwrap().len(), 3);
    assert_eq!(view.state.current_asset_id.as_deref(), Some("intro"));
    assert_eq!(view.current_asset().unwrap().title, "Intro");
    facade.shutdown().await;
}

#[tokio::test]
async fn test_controller_commands_reach_display() {
    let (addr, _hub) = start_server(catalog()).await;

    let mut controller = ControllerClient::start(config(addr, Role::Controller), MemoryStore::new());
    let mut display = DisplayClient::start(config(addr, Role::Display));
    controller
        .facade()
        .wait_for_status(ConnectionStatus::Synchronized, WAIT)
        .await
        .unwrap();
    display
        .facade()
        .wait_for_status(ConnectionStatus::Synchronized, WAIT)
        .await
        .unwrap();
    assert_eq!(display.next_directive().await, Some(DisplayDirective::Idle));

    assert_eq!(controller.playlist().len(), 3);
    // Rien de sélectionné : rien à basculer
    assert!(!controller.toggle_playback().unwrap());

    controller.select("intro").unwrap();
    let root = format!("http://{}/assets", addr);
    assert_eq!(
        display.next_directive().await,
        Some(DisplayDirective::Video {
            url: format!("{}/intro.mp4", root),
            playing: false
        })
    );

    controller
        .facade()
        .wait_until(WAIT, |v| v.state.current_asset_id.as_deref() == Some("intro"))
        .await
        .unwrap();
    assert!(controller.toggle_playback().unwrap());
    assert_eq!(
        display.next_directive().await,
        Some(DisplayDirective::Video {
            url: format!("{}/intro.mp4", root),
            playing: true
        })
    );

    // Une image ne se lit pas
    controller.select("logo").unwrap();
    controller
        .facade()
        .wait_until(WAIT, |v| v.state.current_asset_id.as_deref() == Some("logo"))
        .await
        .unwrap();
    assert!(!controller.toggle_playback().unwrap());

    display.shutdown().await;
    controller.shutdown().await;
}

#[tokio::test]
async fn test_saved_order_applies_to_fetched_catalog() {
    let (addr, _hub) = start_server(catalog()).await;
    let store = Arc::new(MemoryStore::new());

    let mut first = ControllerClient::start(config(addr, Role::Controller), store.clone());
    first
        .facade()
        .wait_for_status(ConnectionStatus::Synchronized, WAIT)
        .await
        .unwrap();
    let ids: Vec<_> = first.reorder(2, 0).unwrap().iter().map(|a| a.id.clone()).collect();
    assert_eq!(ids, ["talk", "logo", "intro"]);
    first.shutdown().await;

    let mut second = ControllerClient::start(config(addr, Role::Controller), store);
    second
        .facade()
        .wait_for_status(ConnectionStatus::Synchronized, WAIT)
        .await
        .unwrap();
    let ids: Vec<_> = second.playlist().iter().map(|a| a.id.clone()).collect();
    assert_eq!(ids, ["talk", "logo", "intro"]);

    let ids: Vec<_> = second.reset_order().unwrap().iter().map(|a| a.id.clone()).collect();
    assert_eq!(ids, ["logo", "intro", "talk"]);
    second.shutdown().await;
}

#[tokio::test]
async fn test_unreadable_catalog_is_reported() {
    let (addr, _hub) = start_server(CatalogProvider::open("/nonexistent/panel/assets.json")).await;

    let mut display = DisplayClient::start(config(addr, Role::Display));
    let view = display
        .facade()
        .wait_for_status(ConnectionStatus::Synchronized, WAIT)
        .await
        .unwrap();
    assert!(matches!(view.catalog, CatalogView::Unavailable(_)));
    assert_eq!(
        display.next_directive().await,
        Some(DisplayDirective::ContentUnavailable)
    );
    display.shutdown().await;
}

#[derive(Clone, Default)]
struct Scripted {
    connections: Arc<AtomicUsize>,
    kick: Arc<Notify>,
    silent: bool,
}

async fn scripted_socket(ws: WebSocketUpgrade, State(script): State<Scripted>) -> Response {
    ws.on_upgrade(move |socket| scripted_session(socket, script))
}

async fn scripted_session(mut socket: WebSocket, script: Scripted) {
    let n = script.connections.fetch_add(1, Ordering::SeqCst) + 1;
    if !script.silent {
        let state = PlaybackState {
            current_asset_id: Some(format!("conn{}", n)),
            is_playing: false,
        };
        let frame = ServerEvent::State(state).encode();
        if socket.send(Message::Text(frame.into())).await.is_err() {
            return;
        }
    }
    script.kick.notified().await;
    let _ = socket.send(Message::Close(None)).await;
}

async fn start_scripted(script: Scripted) -> SocketAddr {
    let router = Router::new()
        .route("/socket", get(scripted_socket))
        .route("/api/assets", get(|| async { CATALOG }))
        .with_state(script);
    serve(router).await
}

#[tokio::test]
async fn test_reconnects_after_server_closes() {
    let script = Scripted::default();
    let addr = start_scripted(script.clone()).await;

    let facade = ClientFacade::start(config(addr, Role::Controller));
    let view = facade
        .wait_for_status(ConnectionStatus::Synchronized, WAIT)
        .await
        .unwrap();
    assert_eq!(view.state.current_asset_id.as_deref(), Some("conn1"));

    let mut views = facade.subscribe();
    script.kick.notify_one();
    views
        .wait_for(|v| v.status != ConnectionStatus::Synchronized)
        .await
        .unwrap();
    assert!(matches!(facade.select("x"), Err(Error::NotConnected)));

    // Nouvelle connexion : nouvel instantané
    let view = facade
        .wait_until(WAIT, |v| {
            v.status == ConnectionStatus::Synchronized
                && v.state.current_asset_id.as_deref() == Some("conn2")
        })
        .await
        .unwrap();
    assert!(view.catalog.catalog().is_some());
    assert_eq!(script.connections.load(Ordering::SeqCst), 2);
    facade.shutdown().await;
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let script = Scripted {
        silent: true,
        ..Default::default()
    };
    let addr = start_scripted(script.clone()).await;

    let facade = ClientFacade::start(config(addr, Role::Display));
    let result = facade
        .wait_for_status(ConnectionStatus::Synchronized, Duration::from_millis(1200))
        .await;
    assert!(matches!(result, Err(Error::Timeout(_))));
    // Chaque échec relance une tentative
    assert!(script.connections.load(Ordering::SeqCst) >= 2);
    assert!(matches!(facade.play(None), Err(Error::NotConnected)));
    facade.shutdown().await;
}
