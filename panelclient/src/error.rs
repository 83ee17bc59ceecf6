use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    #[error("Connection closed by the server")]
    ConnectionClosed,
    #[error("Not synchronized with the server")]
    NotConnected,
    #[error("No catalog received from the server yet")]
    CatalogNotLoaded,
    #[error("Invalid server address '{0}'")]
    InvalidServerUrl(String),
    #[error("Unsupported scheme '{0}', the server speaks plain HTTP")]
    UnsupportedScheme(String),
    #[error(transparent)]
    Catalog(#[from] panelcatalog::Error),
    #[error(transparent)]
    Order(#[from] panelorder::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
