//! Implémentation de [`SyncServerExt`] pour `panelserver::Server`

use panelserver::Server;
use tracing::info;
use utoipa::OpenApi;

use crate::{SyncHub, SyncServerExt, api, ws};

#[async_trait::async_trait]
impl SyncServerExt for Server {
    async fn init_sync_api(&mut self) -> anyhow::Result<SyncHub> {
        let hub = SyncHub::spawn();
        self.attach_sync_hub(hub.clone()).await?;
        Ok(hub)
    }

    async fn attach_sync_hub(&mut self, hub: SyncHub) -> anyhow::Result<()> {
        self.add_handler_with_state("/socket", ws::socket_handler, hub.clone())
            .await;
        self.add_api(api::router(hub), api::ApiDoc::openapi(), "sync")
            .await;

        info!("✅ Sync hub ready: /socket, /api/current-state, /swagger-ui/sync");
        Ok(())
    }
}
