//! Modèle d'asset et résolution des URLs de média
//!
//! Le format JSON est celui du fichier catalogue (`camelCase`, champ `type`
//! discriminant). Les images et vidéos sont désignées par un nom de fichier
//! relatif à la racine des assets, les vidéos YouTube par leur identifiant.

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

const YOUTUBE_EMBED_BASE: &str = "https://www.youtube.com/embed";
const YOUTUBE_THUMBNAIL_BASE: &str = "https://img.youtube.com/vi";

/// Localisation du média, selon son type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Media {
    Image {
        filename: String,
    },
    Video {
        filename: String,
    },
    Youtube {
        #[serde(rename = "videoId")]
        video_id: String,
    },
}

/// Type de média, sans sa localisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Video,
    Youtube,
}

impl AssetKind {
    /// Vrai pour les médias qui ont une notion de lecture/pause
    pub fn is_playable(self) -> bool {
        !matches!(self, AssetKind::Image)
    }
}

/// Élément du catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Identifiant unique dans le catalogue
    #[cfg_attr(feature = "openapi", schema(example = "intro-video"))]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub media: Media,
    /// Vignette, relative à la racine des assets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Durée en secondes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self.media {
            Media::Image { .. } => AssetKind::Image,
            Media::Video { .. } => AssetKind::Video,
            Media::Youtube { .. } => AssetKind::Youtube,
        }
    }

    /// URL du média à afficher
    ///
    /// `asset_root` est la racine sous laquelle les fichiers sont servis
    /// (`/assets` ou `http://host:3001/assets`).
    pub fn media_url(&self, asset_root: &str) -> String {
        match &self.media {
            Media::Image { filename } | Media::Video { filename } => join_url(asset_root, filename),
            Media::Youtube { video_id } => youtube_embed_url(video_id),
        }
    }

    /// URL de la vignette, si l'asset en a une
    ///
    /// Les vidéos YouTube sans vignette explicite utilisent celle de YouTube.
    pub fn thumbnail_url(&self, asset_root: &str) -> Option<String> {
        match (&self.thumbnail, &self.media) {
            (Some(thumbnail), _) => Some(join_url(asset_root, thumbnail)),
            (None, Media::Youtube { video_id }) => Some(format!(
                "{}/{}/maxresdefault.jpg",
                YOUTUBE_THUMBNAIL_BASE, video_id
            )),
            (None, _) => None,
        }
    }

    /// Durée au format `m:ss`
    pub fn duration_label(&self) -> Option<String> {
        self.duration
            .map(|secs| format!("{}:{:02}", secs / 60, secs % 60))
    }
}

/// URL d'intégration YouTube avec l'API JS activée
pub fn youtube_embed_url(video_id: &str) -> String {
    format!("{}/{}?enablejsapi=1", YOUTUBE_EMBED_BASE, video_id)
}

fn join_url(root: &str, file: &str) -> String {
    format!(
        "{}/{}",
        root.trim_end_matches('/'),
        file.trim_start_matches('/')
    )
}
