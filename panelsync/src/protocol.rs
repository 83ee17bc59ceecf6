//! Protocole WebSocket
//!
//! Chaque trame texte est une enveloppe JSON `{ "event": ..., "data": ... }`.
//!
//! | évènement                | sens            | data              |
//! |--------------------------|-----------------|-------------------|
//! | `controller:set-current` | client → hub    | `{ id }`          |
//! | `controller:play`        | client → hub    | `{ id? }`         |
//! | `controller:pause`       | client → hub    | `{ id? }`         |
//! | `display:ready`          | client → hub    | `{}` ou absent    |
//! | `server:state`           | hub → client    | `PlaybackState`   |
//! | `server:error`           | hub → client    | `{ message }`     |

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::{Error, Mutation, PlaybackState, ProtocolError};

pub const SET_CURRENT: &str = "controller:set-current";
pub const PLAY: &str = "controller:play";
pub const PAUSE: &str = "controller:pause";
pub const DISPLAY_READY: &str = "display:ready";
pub const SERVER_STATE: &str = "server:state";
pub const SERVER_ERROR: &str = "server:error";

/// Rôle déclaré par une connexion (`/socket?role=...`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Controller,
    Display,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Controller => "controller",
            Role::Display => "display",
        }
    }

    /// Un affichage ne peut qu'annoncer qu'il est prêt
    pub fn authorize(self, event: &ClientEvent) -> Result<(), Error> {
        if self == Role::Display && event.is_mutation() {
            return Err(Error::RoleRefused {
                role: self,
                event: event.name().to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "controller" => Ok(Role::Controller),
            "display" => Ok(Role::Display),
            other => Err(ProtocolError::Malformed(format!("unknown role '{}'", other))),
        }
    }
}

/// Enveloppe brute d'une trame
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

impl Envelope {
    fn parse(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    fn body<T: DeserializeOwned + Default>(&self) -> Result<T, ProtocolError> {
        if self.data.is_null() {
            return Ok(T::default());
        }
        serde_json::from_value(self.data.clone()).map_err(|e| ProtocolError::InvalidBody {
            event: self.event.clone(),
            reason: e.to_string(),
        })
    }

    fn encode(event: &str, data: Value) -> String {
        json!({ "event": event, "data": data }).to_string()
    }
}

#[derive(Debug, Default, Deserialize)]
struct SelectBody {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TargetBody {
    #[serde(default)]
    id: Option<String>,
}

/// Évènement envoyé par un client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    SetCurrent { id: String },
    Play { id: Option<String> },
    Pause { id: Option<String> },
    DisplayReady,
}

impl ClientEvent {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let envelope = Envelope::parse(text)?;
        match envelope.event.as_str() {
            SET_CURRENT => {
                let body: SelectBody = envelope.body()?;
                let id = body.id.ok_or_else(|| ProtocolError::InvalidBody {
                    event: envelope.event.clone(),
                    reason: "missing field `id`".to_string(),
                })?;
                Ok(ClientEvent::SetCurrent { id })
            }
            PLAY => Ok(ClientEvent::Play {
                id: envelope.body::<TargetBody>()?.id,
            }),
            PAUSE => Ok(ClientEvent::Pause {
                id: envelope.body::<TargetBody>()?.id,
            }),
            DISPLAY_READY => Ok(ClientEvent::DisplayReady),
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::SetCurrent { .. } => SET_CURRENT,
            ClientEvent::Play { .. } => PLAY,
            ClientEvent::Pause { .. } => PAUSE,
            ClientEvent::DisplayReady => DISPLAY_READY,
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, ClientEvent::DisplayReady)
    }

    /// Commande correspondante, `None` pour `display:ready`
    pub fn mutation(&self) -> Option<Mutation> {
        match self {
            ClientEvent::SetCurrent { id } => Some(Mutation::Select(id.clone())),
            ClientEvent::Play { id } => Some(Mutation::Resume(id.clone())),
            ClientEvent::Pause { id } => Some(Mutation::Pause(id.clone())),
            ClientEvent::DisplayReady => None,
        }
    }

    pub fn encode(&self) -> String {
        let data = match self {
            ClientEvent::SetCurrent { id } => json!({ "id": id }),
            ClientEvent::Play { id: Some(id) } | ClientEvent::Pause { id: Some(id) } => {
                json!({ "id": id })
            }
            ClientEvent::Play { id: None }
            | ClientEvent::Pause { id: None }
            | ClientEvent::DisplayReady => json!({}),
        };
        Envelope::encode(self.name(), data)
    }
}

/// Évènement envoyé par le hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    State(PlaybackState),
    Error { message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::State(_) => SERVER_STATE,
            ServerEvent::Error { .. } => SERVER_ERROR,
        }
    }

    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let envelope = Envelope::parse(text)?;
        let invalid = |e: serde_json::Error| ProtocolError::InvalidBody {
            event: envelope.event.clone(),
            reason: e.to_string(),
        };
        match envelope.event.as_str() {
            SERVER_STATE => serde_json::from_value(envelope.data.clone())
                .map(ServerEvent::State)
                .map_err(invalid),
            SERVER_ERROR => serde_json::from_value::<ErrorBody>(envelope.data.clone())
                .map(|b| ServerEvent::Error { message: b.message })
                .map_err(invalid),
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }

    pub fn encode(&self) -> String {
        let data = match self {
            ServerEvent::State(state) => json!({
                "currentAssetId": state.current_asset_id,
                "isPlaying": state.is_playing,
            }),
            ServerEvent::Error { message } => json!({ "message": message }),
        };
        Envelope::encode(self.name(), data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_events() {
        assert_eq!(
            ClientEvent::parse(r#"{"event":"controller:set-current","data":{"id":"v1"}}"#).unwrap(),
            ClientEvent::SetCurrent { id: "v1".into() }
        );
        assert_eq!(
            ClientEvent::parse(r#"{"event":"controller:play","data":{"id":"v1"}}"#).unwrap(),
            ClientEvent::Play {
                id: Some("v1".into())
            }
        );
        assert_eq!(
            ClientEvent::parse(r#"{"event":"controller:pause"}"#).unwrap(),
            ClientEvent::Pause { id: None }
        );
        assert_eq!(
            ClientEvent::parse(r#"{"event":"display:ready","data":{}}"#).unwrap(),
            ClientEvent::DisplayReady
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ClientEvent::parse("not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            ClientEvent::parse(r#"{"event":"controller:stop","data":{}}"#),
            Err(ProtocolError::UnknownEvent(e)) if e == "controller:stop"
        ));
        assert!(matches!(
            ClientEvent::parse(r#"{"event":"controller:set-current","data":{}}"#),
            Err(ProtocolError::InvalidBody { .. })
        ));
        assert!(matches!(
            ClientEvent::parse(r#"{"event":"controller:play","data":{"id":42}}"#),
            Err(ProtocolError::InvalidBody { .. })
        ));
    }

    #[test]
    fn test_server_state_frame() {
        let state = PlaybackState {
            current_asset_id: Some("y1".into()),
            is_playing: true,
        };
        let text = ServerEvent::State(state.clone()).encode();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["event"], SERVER_STATE);
        assert_eq!(value["data"]["currentAssetId"], "y1");
        assert_eq!(value["data"]["isPlaying"], true);
        assert_eq!(ServerEvent::parse(&text).unwrap(), ServerEvent::State(state));
    }

    #[test]
    fn test_client_frames_are_parsable_by_the_hub() {
        for event in [
            ClientEvent::SetCurrent { id: "a".into() },
            ClientEvent::Play { id: None },
            ClientEvent::Pause {
                id: Some("a".into()),
            },
            ClientEvent::DisplayReady,
        ] {
            assert_eq!(ClientEvent::parse(&event.encode()).unwrap(), event);
        }
    }

    #[test]
    fn test_display_role_is_read_only() {
        let select = ClientEvent::SetCurrent { id: "a".into() };
        assert!(Role::Controller.authorize(&select).is_ok());
        assert!(matches!(
            Role::Display.authorize(&select),
            Err(Error::RoleRefused { role: Role::Display, .. })
        ));
        assert!(Role::Display.authorize(&ClientEvent::DisplayReady).is_ok());
        assert_eq!("display".parse::<Role>().unwrap(), Role::Display);
        assert!("admin".parse::<Role>().is_err());
    }
}
