//! Vue immuable exposée par la façade et consigne d'affichage

use std::sync::Arc;

use panelcatalog::{Asset, AssetCatalog, Media, youtube_embed_url};
use panelsync::PlaybackState;

/// État de la connexion au serveur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Synchronized,
}

impl ConnectionStatus {
    pub fn is_connected(self) -> bool {
        self == ConnectionStatus::Synchronized
    }
}

/// Catalogue tel que vu par le client
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogView {
    /// Pas encore récupéré
    Loading,
    Ready(Arc<AssetCatalog>),
    /// Récupération impossible, avec la raison
    Unavailable(String),
}

impl CatalogView {
    pub fn catalog(&self) -> Option<&Arc<AssetCatalog>> {
        match self {
            CatalogView::Ready(catalog) => Some(catalog),
            _ => None,
        }
    }
}

/// Instantané publié à chaque changement
#[derive(Debug, Clone, PartialEq)]
pub struct FacadeView {
    pub status: ConnectionStatus,
    pub catalog: CatalogView,
    pub state: PlaybackState,
}

impl Default for FacadeView {
    fn default() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            catalog: CatalogView::Loading,
            state: PlaybackState::default(),
        }
    }
}

impl FacadeView {
    /// Asset courant, s'il existe dans le catalogue
    pub fn current_asset(&self) -> Option<&Asset> {
        let id = self.state.current_asset_id.as_deref()?;
        self.catalog.catalog()?.get(id)
    }

    /// Ce que l'écran doit montrer
    pub fn directive(&self, asset_root: &str) -> DisplayDirective {
        let catalog = match &self.catalog {
            CatalogView::Loading => return DisplayDirective::Loading,
            CatalogView::Unavailable(_) => return DisplayDirective::ContentUnavailable,
            CatalogView::Ready(catalog) => catalog,
        };

        let Some(id) = self.state.current_asset_id.as_deref() else {
            return DisplayDirective::Idle;
        };
        let Some(asset) = catalog.get(id) else {
            return DisplayDirective::Missing { id: id.to_string() };
        };

        let playing = self.state.is_playing;
        match &asset.media {
            Media::Image { .. } => DisplayDirective::Image {
                url: asset.media_url(asset_root),
            },
            Media::Video { .. } => DisplayDirective::Video {
                url: asset.media_url(asset_root),
                playing,
            },
            Media::Youtube { video_id } => DisplayDirective::Youtube {
                video_id: video_id.clone(),
                embed_url: youtube_embed_url(video_id),
                playing,
            },
        }
    }
}

/// Consigne de rendu pour l'écran partagé
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayDirective {
    /// Catalogue pas encore reçu
    Loading,
    /// Catalogue illisible : état distinct d'un écran vide
    ContentUnavailable,
    /// Aucune sélection
    Idle,
    /// Sélection inconnue du catalogue
    Missing { id: String },
    Image { url: String },
    Video { url: String, playing: bool },
    Youtube {
        video_id: String,
        embed_url: String,
        playing: bool,
    },
}
