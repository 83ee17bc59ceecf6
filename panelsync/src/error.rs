use thiserror::Error;

use crate::protocol::Role;

/// Trame client invalide
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    Malformed(String),
    #[error("Unknown event '{0}'")]
    UnknownEvent(String),
    #[error("Invalid body for '{event}': {reason}")]
    InvalidBody { event: String, reason: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Sync hub is not running")]
    HubClosed,
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("A {role} connection may not send '{event}'")]
    RoleRefused { role: Role, event: String },
}

pub type Result<T> = std::result::Result<T, Error>;
