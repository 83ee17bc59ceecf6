//! # panelserver - Serveur web haut niveau basé sur Axum
//!
//! Cette crate fournit l'enveloppe HTTP commune à Panel Talk : le routeur
//! Axum, le montage des API documentées et le système de logs.
//!
//! ## Fonctionnalités
//!
//! - 🚀 **API de haut niveau** : routes JSON, handlers avec état, sous-routeurs
//! - 📚 **Documentation OpenAPI** : chaque API montée sous `/api` publie son Swagger UI
//! - 📡 **Server-Sent Events (SSE)** : suivi des logs en temps réel via `/log-sse`
//! - ⚡ **Arrêt gracieux** : gestion propre de l'arrêt sur Ctrl+C
//!
//! ## Architecture
//!
//! - [`server`] : serveur principal et builder
//! - [`logs`] : tampon circulaire de logs, couche `tracing` et routes associées
//!
//! Les crates fonctionnelles (`panelcatalog`, `panelsync`) étendent [`Server`]
//! par des traits d'extension, sans que `panelserver` ne les connaisse.
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use panelserver::ServerBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = ServerBuilder::new("MyServer", "localhost", 3001).build();
//!
//!     server.add_route("/info", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LogState, LoggingOptions, SseLayer, log_dump, log_sse};
pub use server::{Server, ServerBuilder, ServerInfo};
