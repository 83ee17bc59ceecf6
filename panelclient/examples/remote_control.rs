//! Télécommande minimale en ligne de commande
//!
//! `cargo run -p panelclient --example remote_control -- 192.168.1.10`
//!
//! Sans argument, l'adresse sauvegardée (ou celle de la configuration) est
//! utilisée. Affiche la playlist, sélectionne le premier asset puis montre
//! ce que l'écran partagé affiche.

use std::time::Duration;

use panelclient::{
    ClientConfig, ConnectionStatus, ControllerClient, DisplayClient, ServerSettings,
};
use panelconfig::get_config;
use panelorder::FileStore;
use panelsync::Role;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let store = FileStore::open(get_config().get_client_store_dir()?)?;
    let settings = ServerSettings::new(store.clone());

    let mut config = ClientConfig::from_config(Role::Controller)?;
    if let Some(address) = std::env::args().nth(1) {
        config.server_url = settings.save(&address)?;
    } else if let Some(saved) = settings.load() {
        config.server_url = saved;
    }
    println!("Server: {}", config.server_url);

    let mut controller = ControllerClient::start(config.clone(), store);
    let mut display = DisplayClient::start(config);

    controller
        .facade()
        .wait_for_status(ConnectionStatus::Synchronized, Duration::from_secs(10))
        .await?;
    // Le catalogue arrive avant la synchronisation
    let playlist = controller.playlist().to_vec();

    println!("=====================");
    println!("Playlist: {} assets", playlist.len());
    for (index, asset) in playlist.iter().enumerate() {
        println!(
            "{:>2}. [{}] {} ({:?}) {}",
            index + 1,
            asset.id,
            asset.title,
            asset.kind(),
            asset.duration_label().unwrap_or_default()
        );
    }
    println!("=====================");

    if let Some(first) = playlist.first() {
        controller.select(first.id.clone())?;
        controller
            .facade()
            .wait_until(Duration::from_secs(5), |v| {
                v.state.current_asset_id.as_deref() == Some(first.id.as_str())
            })
            .await?;
        if controller.toggle_playback()? {
            println!("Playback started for {}", first.id);
        }
    }

    let watch = tokio::time::timeout(Duration::from_secs(3), async {
        while let Some(directive) = display.next_directive().await {
            println!("Display: {:?}", directive);
        }
    });
    let _ = watch.await;

    display.shutdown().await;
    controller.shutdown().await;
    Ok(())
}
