//! # panelcatalog - Catalogue des assets de Panel Talk
//!
//! Le catalogue est la liste ordonnée des médias affichables (images,
//! vidéos, vidéos YouTube), lue depuis un fichier JSON :
//!
//! ```json
//! { "playlist": [
//!     { "id": "v1", "type": "video", "title": "Intro", "filename": "intro.mp4" },
//!     { "id": "y1", "type": "youtube", "title": "Talk", "videoId": "dQw4w9WgXcQ" }
//! ] }
//! ```
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use panelcatalog::AssetCatalog;
//!
//! let catalog = AssetCatalog::load("data/assets.json")?;
//! for asset in catalog.assets() {
//!     println!("{} -> {}", asset.title, asset.media_url("/assets"));
//! }
//! # Ok::<(), panelcatalog::Error>(())
//! ```
//!
//! Avec la feature `panelserver` (par défaut), [`CatalogServerExt`] ajoute
//! l'API REST du catalogue à `panelserver::Server`.

pub mod asset;
pub mod catalog;
pub mod error;

#[cfg(feature = "panelserver")]
pub mod api;

#[cfg(feature = "panelserver")]
mod panelserver_impl;

pub use asset::{Asset, AssetKind, Media, youtube_embed_url};
pub use catalog::{AssetCatalog, CatalogProvider};
pub use error::{Error, Result};

#[cfg(feature = "panelserver")]
use std::{path::Path, sync::Arc};

/// Trait d'extension pour ajouter l'API catalogue à panelserver
///
/// # Routes enregistrées
///
/// - `GET /api/assets`, `GET /api/playlist`, `GET /api/assets/{id}`
/// - `POST /api/catalog/reload`
/// - `GET /swagger-ui/catalog` - Documentation interactive
#[cfg(feature = "panelserver")]
#[async_trait::async_trait]
pub trait CatalogServerExt {
    /// Charge le catalogue depuis `path` et enregistre les routes
    ///
    /// Un fichier absent ou invalide n'empêche pas le démarrage : les routes
    /// répondent alors `500` jusqu'au prochain rechargement réussi.
    async fn init_catalog_api(&mut self, path: &Path) -> anyhow::Result<Arc<CatalogProvider>>;

    /// Comme [`init_catalog_api`](Self::init_catalog_api), avec `catalog.path`
    async fn init_catalog_api_configured(&mut self) -> anyhow::Result<Arc<CatalogProvider>>;
}
