use panelcatalog::CatalogServerExt;
use panelconfig::get_config;
use panelserver::{LoggingOptions, ServerBuilder};
use panelsync::SyncServerExt;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ========== PHASE 1 : Infrastructure ==========
    let mut server = ServerBuilder::new_configured().build();
    server.init_logging(LoggingOptions::from_config()).await;

    server
        .add_route("/info", || async {
            serde_json::json!({
                "name": "Panel Talk",
                "version": env!("CARGO_PKG_VERSION"),
            })
        })
        .await;

    // ========== PHASE 2 : Catalogue et synchronisation ==========
    info!("📚 Loading asset catalog...");
    let catalog = server.init_catalog_api_configured().await?;
    match catalog.get() {
        Ok(assets) => info!("✅ {} asset(s) available", assets.len()),
        // Le serveur démarre quand même : /api/assets répondra 500
        Err(e) => warn!(
            "⚠️ Catalog {} unavailable: {}",
            catalog.path().display(),
            e
        ),
    }

    info!("🔗 Starting playback synchronization hub...");
    let hub = server.init_sync_api().await?;
    let state = hub.snapshot().await?;
    info!(
        "✅ Sync hub ready (current asset: {})",
        state.current_asset_id.as_deref().unwrap_or("none")
    );

    // ========== PHASE 3 : Démarrage du serveur ==========
    info!("🌐 Starting HTTP server...");
    server.start().await?;

    let port = get_config().get_http_port();
    info!("✅ Panel Talk is ready!");
    info!("  Controllers: ws://<host>:{}/socket?role=controller", port);
    info!("  Displays:    ws://<host>:{}/socket?role=display", port);
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    Ok(())
}
