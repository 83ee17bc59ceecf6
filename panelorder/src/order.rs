//! Ordre personnalisé de la playlist
//!
//! L'ordre sauvegardé est une simple liste d'identifiants appliquée par-dessus
//! l'ordre du catalogue : il ne modifie jamais le catalogue lui-même.

use panelcatalog::{Asset, AssetCatalog};
use tracing::{debug, warn};

use crate::{KeyValueStore, Result};

/// Clé sous laquelle l'ordre est sauvegardé
pub const PLAYLIST_ORDER_KEY: &str = "panel-talk-playlist-order";

/// Élément ordonnable par son identifiant
pub trait OrderKey {
    fn order_key(&self) -> &str;
}

impl OrderKey for Asset {
    fn order_key(&self) -> &str {
        &self.id
    }
}

impl OrderKey for String {
    fn order_key(&self) -> &str {
        self
    }
}

impl OrderKey for &str {
    fn order_key(&self) -> &str {
        self
    }
}

/// Applique un ordre sauvegardé au catalogue
///
/// Les éléments cités par `saved` viennent d'abord, dans cet ordre ; les
/// identifiants inconnus sont ignorés et les éléments jamais cités suivent
/// dans l'ordre du catalogue. Le résultat est toujours une permutation de
/// `catalog`.
pub fn apply_order<T: OrderKey + Clone>(catalog: &[T], saved: Option<&[String]>) -> Vec<T> {
    let saved = match saved {
        Some(saved) if !saved.is_empty() => saved,
        _ => return catalog.to_vec(),
    };

    let mut remaining: Vec<&T> = catalog.iter().collect();
    let mut ordered = Vec::with_capacity(catalog.len());

    for id in saved {
        if let Some(pos) = remaining.iter().position(|item| item.order_key() == id) {
            ordered.push(remaining.remove(pos).clone());
        }
    }
    ordered.extend(remaining.into_iter().cloned());
    ordered
}

/// Déplace l'élément `from` à la position `to`
///
/// Ce n'est pas un échange : les éléments intermédiaires glissent d'un cran.
/// Les deux indices sont ramenés dans `[0, len-1]`.
pub fn reorder<T: Clone>(current: &[T], from: usize, to: usize) -> Vec<T> {
    let mut result = current.to_vec();
    if result.is_empty() {
        return result;
    }
    let last = result.len() - 1;
    let item = result.remove(from.min(last));
    result.insert(to.min(last), item);
    result
}

/// Séquence d'identifiants à sauvegarder
pub fn ids_of<T: OrderKey>(items: &[T]) -> Vec<String> {
    items.iter().map(|item| item.order_key().to_string()).collect()
}

/// Lit l'ordre sauvegardé
///
/// Une valeur illisible ou corrompue est traitée comme une absence d'ordre.
pub fn load_saved_order<S: KeyValueStore + ?Sized>(store: &S) -> Option<Vec<String>> {
    let raw = match store.get(PLAYLIST_ORDER_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!("Cannot read saved playlist order, using catalog order: {}", e);
            return None;
        }
    };

    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(ids) => Some(ids),
        Err(e) => {
            warn!("Ignoring corrupt saved playlist order: {}", e);
            None
        }
    }
}

/// Sauvegarde une séquence d'identifiants
pub fn save_order<S: KeyValueStore + ?Sized>(store: &S, ids: &[String]) -> Result<()> {
    let json = serde_json::to_string(ids)?;
    store.set(PLAYLIST_ORDER_KEY, &json)?;
    debug!("Playlist order saved: {:?}", ids);
    Ok(())
}

/// Efface l'ordre sauvegardé
pub fn reset<S: KeyValueStore + ?Sized>(store: &S) -> Result<()> {
    store.remove(PLAYLIST_ORDER_KEY)
}

/// Playlist présentée à l'utilisateur, liée à son stockage
///
/// L'ordre présenté et l'ordre sauvegardé ne divergent jamais : une
/// modification est d'abord écrite, puis seulement appliquée.
pub struct PlaylistOrder<S: KeyValueStore> {
    store: S,
    catalog: Vec<Asset>,
    items: Vec<Asset>,
}

impl<S: KeyValueStore> PlaylistOrder<S> {
    /// Lit l'ordre sauvegardé et l'applique au catalogue
    pub fn load(catalog: &AssetCatalog, store: S) -> Self {
        let catalog = catalog.assets().to_vec();
        let saved = load_saved_order(&store);
        let items = apply_order(&catalog, saved.as_deref());
        Self {
            store,
            catalog,
            items,
        }
    }

    /// Remplace le catalogue (nouveau chargement) en réappliquant l'ordre
    pub fn set_catalog(&mut self, catalog: &AssetCatalog) {
        self.catalog = catalog.assets().to_vec();
        let saved = load_saved_order(&self.store);
        self.items = apply_order(&self.catalog, saved.as_deref());
    }

    /// Éléments dans l'ordre présenté
    pub fn items(&self) -> &[Asset] {
        &self.items
    }

    pub fn ids(&self) -> Vec<String> {
        ids_of(&self.items)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Déplace un élément et sauvegarde le nouvel ordre
    ///
    /// En cas d'échec d'écriture, l'ordre présenté reste inchangé. Une liste
    /// vide n'a rien à déplacer : l'ordre sauvegardé n'est pas touché.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<&[Asset]> {
        if self.items.is_empty() {
            return Ok(&self.items);
        }
        let next = reorder(&self.items, from, to);
        save_order(&self.store, &ids_of(&next))?;
        self.items = next;
        Ok(&self.items)
    }

    /// Revient à l'ordre du catalogue
    pub fn reset(&mut self) -> Result<&[Asset]> {
        reset(&self.store)?;
        self.items = self.catalog.clone();
        Ok(&self.items)
    }

    /// Sauvegarde l'ordre présenté
    pub fn save(&self) -> Result<()> {
        save_order(&self.store, &self.ids())
    }
}
