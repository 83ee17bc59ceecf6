//! État de lecture partagé

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// État de lecture faisant autorité
///
/// `current_asset_id` est une référence faible : l'identifiant n'est pas
/// vérifié contre le catalogue, c'est à l'affichage de le résoudre.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub current_asset_id: Option<String>,
    pub is_playing: bool,
}

/// Commande de modification de l'état
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Sélectionne un asset, toujours en pause
    Select(String),
    /// Lance la lecture de l'asset courant
    Resume(Option<String>),
    /// Met en pause l'asset courant
    Pause(Option<String>),
}

impl Mutation {
    /// Identifiant explicitement visé par une commande de lecture
    pub fn target(&self) -> Option<&str> {
        match self {
            Mutation::Select(_) => None,
            Mutation::Resume(target) | Mutation::Pause(target) => target.as_deref(),
        }
    }
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: impl Into<String>) {
        self.current_asset_id = Some(id.into());
        self.is_playing = false;
    }

    /// Sans sélection, l'état reste en pause
    pub fn resume(&mut self) {
        self.is_playing = self.current_asset_id.is_some();
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    pub fn apply(&mut self, mutation: &Mutation) {
        match mutation {
            Mutation::Select(id) => self.select(id.clone()),
            Mutation::Resume(_) => self.resume(),
            Mutation::Pause(_) => self.pause(),
        }
    }

    /// Vrai si `target` désigne autre chose que l'asset courant
    pub fn is_mismatch(&self, target: Option<&str>) -> bool {
        match target {
            Some(id) => self.current_asset_id.as_deref() != Some(id),
            None => false,
        }
    }
}
