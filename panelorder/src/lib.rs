//! # panelorder - Ordre personnalisé de la playlist
//!
//! Chaque client peut réordonner la playlist sans toucher au catalogue :
//! l'ordre choisi est sauvegardé localement comme une liste d'identifiants
//! et réappliqué à chaque chargement du catalogue.
//!
//! ```rust
//! use panelorder::{apply_order, ids_of, reorder};
//!
//! let catalog: Vec<String> = ["A", "B", "C"].map(String::from).to_vec();
//! let moved = reorder(&catalog, 0, 2);
//! assert_eq!(ids_of(&moved), ["B", "C", "A"]);
//!
//! let grown: Vec<String> = ["A", "B", "C", "D"].map(String::from).to_vec();
//! let saved = ids_of(&moved);
//! assert_eq!(apply_order(&grown, Some(saved.as_slice())), ["B", "C", "A", "D"]);
//! ```

pub mod error;
pub mod order;
pub mod store;

pub use error::{Error, Result};
pub use order::{
    OrderKey, PLAYLIST_ORDER_KEY, PlaylistOrder, apply_order, ids_of, load_saved_order, reorder,
    reset, save_order,
};
pub use store::{FileStore, KeyValueStore, MemoryStore};
