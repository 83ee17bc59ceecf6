//! Télécommande : playlist réordonnable et commandes de lecture

use std::sync::Arc;

use panelcatalog::{Asset, AssetCatalog};
use panelorder::{KeyValueStore, PlaylistOrder};
use panelsync::Role;
use tracing::debug;

use crate::{ClientConfig, ClientFacade, ConnectionStatus, Error, FacadeView, Result};

/// Client de rôle `controller`
///
/// La playlist présentée est le catalogue du serveur réordonné selon
/// l'ordre sauvegardé dans `store`. Elle est recalculée dès que la façade
/// reçoit un nouveau catalogue.
pub struct ControllerClient<S: KeyValueStore> {
    facade: ClientFacade,
    order: PlaylistOrder<S>,
    catalog_seen: Option<Arc<AssetCatalog>>,
}

impl<S: KeyValueStore> ControllerClient<S> {
    pub fn start(config: ClientConfig, store: S) -> Self {
        let config = ClientConfig {
            role: Role::Controller,
            ..config
        };
        Self {
            facade: ClientFacade::start(config),
            order: PlaylistOrder::load(&AssetCatalog::default(), store),
            catalog_seen: None,
        }
    }

    pub fn facade(&self) -> &ClientFacade {
        &self.facade
    }

    pub fn status(&self) -> ConnectionStatus {
        self.facade.status()
    }

    pub fn view(&self) -> FacadeView {
        self.facade.view()
    }

    fn refresh(&mut self) {
        let view = self.facade.view();
        let Some(catalog) = view.catalog.catalog() else {
            return;
        };
        let changed = self
            .catalog_seen
            .as_ref()
            .is_none_or(|seen| !Arc::ptr_eq(seen, catalog));
        if changed {
            debug!("Applying saved order to a new catalog ({} assets)", catalog.len());
            self.order.set_catalog(catalog);
            self.catalog_seen = Some(catalog.clone());
        }
    }

    /// Playlist dans l'ordre personnalisé
    pub fn playlist(&mut self) -> &[Asset] {
        self.refresh();
        self.order.items()
    }

    /// Déplace un élément ; l'ordre est sauvegardé avant d'être présenté
    ///
    /// Refusé tant qu'aucun catalogue n'a été reçu.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<&[Asset]> {
        self.refresh();
        if self.catalog_seen.is_none() {
            return Err(Error::CatalogNotLoaded);
        }
        Ok(self.order.reorder(from, to)?)
    }

    /// Oublie l'ordre personnalisé
    pub fn reset_order(&mut self) -> Result<&[Asset]> {
        self.refresh();
        Ok(self.order.reset()?)
    }

    pub fn select(&self, id: impl Into<String>) -> Result<()> {
        self.facade.select(id)
    }

    pub fn play(&self) -> Result<()> {
        self.facade.play(self.current_id())
    }

    pub fn pause(&self) -> Result<()> {
        self.facade.pause(self.current_id())
    }

    fn current_id(&self) -> Option<String> {
        self.facade.view().state.current_asset_id
    }

    /// Bascule lecture/pause de l'asset courant
    ///
    /// Sans effet (retourne `false`) sans sélection ou pour une image.
    pub fn toggle_playback(&self) -> Result<bool> {
        let view = self.facade.view();
        let Some(asset) = view.current_asset() else {
            return Ok(false);
        };
        if !asset.kind().is_playable() {
            return Ok(false);
        }

        let target = Some(asset.id.clone());
        if view.state.is_playing {
            self.facade.pause(target)?;
        } else {
            self.facade.play(target)?;
        }
        Ok(true)
    }

    pub async fn shutdown(self) {
        self.facade.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelorder::{MemoryStore, PLAYLIST_ORDER_KEY};
    use std::time::Duration;
    use url::Url;

    #[tokio::test]
    async fn test_reorder_before_catalog_keeps_saved_order() {
        // Port libéré : aucun catalogue n'arrivera
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let store = Arc::new(MemoryStore::new());
        store.set(PLAYLIST_ORDER_KEY, r#"["B","A"]"#).unwrap();

        let url = Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();
        let config = ClientConfig::new(url, Role::Controller)
            .with_timeouts(Duration::from_millis(200), Duration::from_millis(50));
        let mut controller = ControllerClient::start(config, store.clone());

        assert!(matches!(controller.reorder(0, 1), Err(Error::CatalogNotLoaded)));

        controller
            .facade()
            .wait_until(Duration::from_secs(2), |v| {
                matches!(v.catalog, crate::CatalogView::Unavailable(_))
            })
            .await
            .unwrap();
        assert!(matches!(controller.reorder(0, 1), Err(Error::CatalogNotLoaded)));
        assert!(controller.playlist().is_empty());

        assert_eq!(
            store.get(PLAYLIST_ORDER_KEY).unwrap().as_deref(),
            Some(r#"["B","A"]"#)
        );
        controller.shutdown().await;
    }
}
