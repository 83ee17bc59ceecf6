//! Implémentation de [`CatalogServerExt`] pour `panelserver::Server`

use std::{path::Path, sync::Arc};

use panelserver::Server;
use tracing::info;
use utoipa::OpenApi;

use crate::{CatalogProvider, CatalogServerExt, api};

#[async_trait::async_trait]
impl CatalogServerExt for Server {
    async fn init_catalog_api(&mut self, path: &Path) -> anyhow::Result<Arc<CatalogProvider>> {
        let provider = Arc::new(CatalogProvider::open(path));

        self.add_api(api::router(provider.clone()), api::ApiDoc::openapi(), "catalog")
            .await;
        info!("✅ Catalog API ready: /api/assets, /api/playlist, /swagger-ui/catalog");

        Ok(provider)
    }

    async fn init_catalog_api_configured(&mut self) -> anyhow::Result<Arc<CatalogProvider>> {
        let path = panelconfig::get_config().get_catalog_path();
        self.init_catalog_api(&path).await
    }
}
