//! Écran partagé : suit l'état et produit des consignes de rendu

use panelsync::Role;
use tokio::sync::watch;

use crate::{ClientConfig, ClientFacade, ConnectionStatus, DisplayDirective, FacadeView};

/// Client de rôle `display`
///
/// N'émet aucune commande : annonce `display:ready` à chaque connexion et
/// traduit chaque état reçu en [`DisplayDirective`].
pub struct DisplayClient {
    facade: ClientFacade,
    asset_root: String,
    views: watch::Receiver<FacadeView>,
    last: Option<DisplayDirective>,
}

impl DisplayClient {
    pub fn start(config: ClientConfig) -> Self {
        let config = ClientConfig {
            role: Role::Display,
            ..config
        };
        let asset_root = config.asset_root();
        let facade = ClientFacade::start(config);
        let views = facade.subscribe();
        Self {
            facade,
            asset_root,
            views,
            last: None,
        }
    }

    pub fn facade(&self) -> &ClientFacade {
        &self.facade
    }

    pub fn status(&self) -> ConnectionStatus {
        self.facade.status()
    }

    /// Consigne pour la vue courante
    pub fn directive(&self) -> DisplayDirective {
        self.facade.view().directive(&self.asset_root)
    }

    /// Attend une consigne différente de la précédente
    ///
    /// Le premier appel rend la consigne courante.
    pub async fn next_directive(&mut self) -> Option<DisplayDirective> {
        if self.last.is_none() {
            let current = self.views.borrow_and_update().directive(&self.asset_root);
            self.last = Some(current.clone());
            return Some(current);
        }

        loop {
            self.views.changed().await.ok()?;
            let directive = self.views.borrow_and_update().directive(&self.asset_root);
            if self.last.as_ref() != Some(&directive) {
                self.last = Some(directive.clone());
                return Some(directive);
            }
        }
    }

    pub async fn shutdown(self) {
        self.facade.shutdown().await;
    }
}
