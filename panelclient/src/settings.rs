//! Adresse du serveur saisie par l'utilisateur

use panelorder::KeyValueStore;
use tracing::{info, warn};
use url::Url;

use crate::{Error, Result};

/// Clé sous laquelle l'adresse du serveur est sauvegardée
pub const SERVER_URL_KEY: &str = "panel-talk-server-url";

pub const DEFAULT_SERVER_PORT: u16 = 3001;

/// Normalise une adresse saisie (`192.168.1.10`, `example.com:8080/`...)
///
/// Les espaces sont retirés, le schéma `http://` est ajouté s'il manque et
/// le port 3001 est ajouté quand aucun port n'est donné. Le serveur ne parle
/// que HTTP en clair : tout autre schéma est refusé.
pub fn normalize_server_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidServerUrl(input.to_string()));
    }

    let with_scheme = match trimmed.split_once("://") {
        Some((scheme, _)) if scheme.eq_ignore_ascii_case("http") => trimmed.to_string(),
        Some((scheme, _)) => return Err(Error::UnsupportedScheme(scheme.to_string())),
        None => format!("http://{}", trimmed),
    };

    let (scheme, rest) = with_scheme
        .split_once("://")
        .ok_or_else(|| Error::InvalidServerUrl(input.to_string()))?;
    let authority_end = rest.find('/').unwrap_or(rest.len());
    let (authority, path) = rest.split_at(authority_end);

    let has_port = authority
        .rsplit_once(':')
        .is_some_and(|(host, port)| {
            !host.is_empty() && !port.is_empty() && port.chars().all(|c| c.is_ascii_digit())
        })
        && !authority.ends_with(']');
    let authority = if has_port {
        authority.to_string()
    } else {
        format!("{}:{}", authority, DEFAULT_SERVER_PORT)
    };

    let url = Url::parse(&format!("{}://{}{}", scheme, authority, path))
        .map_err(|_| Error::InvalidServerUrl(input.to_string()))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidServerUrl(input.to_string()));
    }
    Ok(url)
}

/// Adresse du serveur mémorisée entre deux lancements
pub struct ServerSettings<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ServerSettings<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Adresse sauvegardée ; une valeur illisible est ignorée
    pub fn load(&self) -> Option<Url> {
        let saved = match self.store.get(SERVER_URL_KEY) {
            Ok(saved) => saved?,
            Err(e) => {
                warn!("Cannot read saved server address: {}", e);
                return None;
            }
        };
        match Url::parse(&saved) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Ignoring saved server address '{}': {}", saved, e);
                None
            }
        }
    }

    /// Normalise puis sauvegarde une adresse
    pub fn save(&self, input: &str) -> Result<Url> {
        let url = normalize_server_url(input)?;
        self.store.set(SERVER_URL_KEY, url.as_str())?;
        info!("Server address set to {}", url);
        Ok(url)
    }

    /// Oublie l'adresse sauvegardée
    pub fn clear(&self) -> Result<()> {
        self.store.remove(SERVER_URL_KEY)?;
        Ok(())
    }
}
