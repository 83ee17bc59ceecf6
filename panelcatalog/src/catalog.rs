//! Chargement et consultation du catalogue d'assets

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::{Asset, Error, Result};

/// Liste ordonnée et immuable des assets
///
/// L'ordre est celui du fichier ; c'est l'ordre « catalogue » sur lequel
/// s'appuie l'ordre personnalisé de la playlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AssetCatalog {
    playlist: Vec<Asset>,
}

impl AssetCatalog {
    /// Construit un catalogue en vérifiant l'unicité des identifiants
    pub fn new(playlist: Vec<Asset>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(playlist.len());
        for asset in &playlist {
            if !seen.insert(asset.id.as_str()) {
                return Err(Error::DuplicateAssetId(asset.id.clone()));
            }
        }
        Ok(Self { playlist })
    }

    /// Analyse un document `{ "playlist": [...] }`
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: AssetCatalog = serde_json::from_str(json)?;
        Self::new(doc.playlist)
    }

    /// Lit et valide le fichier catalogue
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn assets(&self) -> &[Asset] {
        &self.playlist
    }

    pub fn get(&self, id: &str) -> Option<&Asset> {
        self.playlist.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> Vec<String> {
        self.playlist.iter().map(|a| a.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.playlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlist.is_empty()
    }
}

/// Accès partagé au catalogue chargé depuis un fichier
///
/// Un échec de chargement est conservé tel quel : les lecteurs obtiennent
/// [`Error::Unavailable`] plutôt qu'un catalogue vide.
pub struct CatalogProvider {
    path: PathBuf,
    current: RwLock<std::result::Result<Arc<AssetCatalog>, String>>,
}

impl CatalogProvider {
    /// Crée le fournisseur et tente un premier chargement
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let provider = Self {
            path: path.into(),
            current: RwLock::new(Err("catalog not loaded yet".to_string())),
        };
        // L'échec est journalisé et mémorisé, pas propagé
        let _ = provider.reload();
        provider
    }

    /// Fournisseur sur un catalogue déjà construit (sans fichier)
    pub fn from_catalog(catalog: AssetCatalog) -> Self {
        Self {
            path: PathBuf::new(),
            current: RwLock::new(Ok(Arc::new(catalog))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Relit le fichier et remplace le catalogue courant
    pub fn reload(&self) -> Result<Arc<AssetCatalog>> {
        let loaded = AssetCatalog::load(&self.path).map(Arc::new);

        match &loaded {
            Ok(catalog) => info!(
                "📚 Catalog loaded from {} ({} assets)",
                self.path.display(),
                catalog.len()
            ),
            Err(e) => error!("❌ Failed to load catalog: {}", e),
        }

        let mut current = self
            .current
            .write()
            .map_err(|_| Error::Unavailable("catalog lock poisoned".to_string()))?;
        *current = match &loaded {
            Ok(catalog) => Ok(catalog.clone()),
            Err(e) => Err(e.to_string()),
        };

        loaded
    }

    /// Catalogue courant, ou la raison de son indisponibilité
    pub fn get(&self) -> Result<Arc<AssetCatalog>> {
        let current = self
            .current
            .read()
            .map_err(|_| Error::Unavailable("catalog lock poisoned".to_string()))?;
        current.clone().map_err(Error::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Media;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "playlist": [
            { "id": "a", "type": "image", "title": "A", "filename": "a.png" },
            { "id": "b", "type": "video", "title": "B", "filename": "b.mp4", "duration": 42 },
            { "id": "c", "type": "youtube", "title": "C", "videoId": "xyz" }
        ]
    }"#;

    #[test]
    fn test_from_json_keeps_file_order() {
        let catalog = AssetCatalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.ids(), vec!["a", "b", "c"]);
        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains("b"));
        assert!(catalog.get("zz").is_none());
        assert_eq!(
            catalog.get("c").unwrap().media,
            Media::Youtube {
                video_id: "xyz".into()
            }
        );
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let json = r#"{ "playlist": [
            { "id": "a", "type": "image", "title": "A", "filename": "a.png" },
            { "id": "a", "type": "image", "title": "A2", "filename": "a2.png" }
        ] }"#;
        match AssetCatalog::from_json(json) {
            Err(Error::DuplicateAssetId(id)) => assert_eq!(id, "a"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AssetCatalog::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_provider_reports_unavailable_then_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.json");

        let provider = CatalogProvider::open(&path);
        assert!(matches!(provider.get(), Err(Error::Unavailable(_))));

        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        drop(file);

        let reloaded = provider.reload().unwrap();
        assert_eq!(reloaded.len(), 3);
        assert_eq!(provider.get().unwrap().ids(), vec!["a", "b", "c"]);

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(provider.reload(), Err(Error::Parse(_))));
        assert!(matches!(provider.get(), Err(Error::Unavailable(_))));
    }
}
