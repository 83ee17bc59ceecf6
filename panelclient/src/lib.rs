//! # panelclient - Clients Panel Talk
//!
//! Façade réseau partagée par la télécommande et l'écran :
//!
//! - récupère le catalogue (`GET /api/assets`) ;
//! - ouvre la WebSocket `/socket` avec son rôle et attend le premier
//!   `server:state` ;
//! - publie une [`FacadeView`] immuable (statut, catalogue, état) à chaque
//!   changement ;
//! - se reconnecte seule après une perte de connexion.
//!
//! [`ControllerClient`] ajoute la playlist réordonnable et les commandes,
//! [`DisplayClient`] traduit l'état en [`DisplayDirective`].
//!
//! ```rust,no_run
//! use panelclient::{ClientConfig, ConnectionStatus, DisplayClient};
//! use panelsync::Role;
//! use std::time::Duration;
//!
//! # async fn example() -> panelclient::Result<()> {
//! let mut display = DisplayClient::start(ClientConfig::from_config(Role::Display)?);
//! display
//!     .facade()
//!     .wait_for_status(ConnectionStatus::Synchronized, Duration::from_secs(10))
//!     .await?;
//! while let Some(directive) = display.next_directive().await {
//!     println!("{:?}", directive);
//! }
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod display;
pub mod error;
pub mod facade;
pub mod settings;
pub mod view;

pub use controller::ControllerClient;
pub use display::DisplayClient;
pub use error::{Error, Result};
pub use facade::{ClientConfig, ClientFacade};
pub use settings::{DEFAULT_SERVER_PORT, SERVER_URL_KEY, ServerSettings, normalize_server_url};
pub use view::{CatalogView, ConnectionStatus, DisplayDirective, FacadeView};
