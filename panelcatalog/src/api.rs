//! API REST du catalogue
//!
//! Routes (montées sous `/api`) :
//! - `GET /assets` : document complet `{ playlist: [...] }`
//! - `GET /playlist` : tableau des assets
//! - `GET /assets/{id}` : un asset
//! - `POST /catalog/reload` : relecture du fichier

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::{Asset, AssetCatalog, CatalogProvider, Error, Media};

/// Réponse d'erreur
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Failed to load assets")]
    pub error: String,
}

/// Réponse au rechargement du catalogue
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReloadResponse {
    /// Nombre d'assets chargés
    pub assets: usize,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn unavailable(e: Error) -> Response {
    tracing::warn!("Catalog request failed: {}", e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Catalogue complet
#[utoipa::path(
    get,
    path = "/assets",
    responses(
        (status = 200, description = "Catalogue complet", body = AssetCatalog),
        (status = 500, description = "Catalogue illisible", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn get_assets(State(provider): State<Arc<CatalogProvider>>) -> Response {
    match provider.get() {
        Ok(catalog) => Json(catalog.as_ref().clone()).into_response(),
        Err(e) => unavailable(e),
    }
}

/// Assets dans l'ordre du catalogue
#[utoipa::path(
    get,
    path = "/playlist",
    responses(
        (status = 200, description = "Liste ordonnée des assets", body = [Asset]),
        (status = 500, description = "Catalogue illisible", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn get_playlist(State(provider): State<Arc<CatalogProvider>>) -> Response {
    match provider.get() {
        Ok(catalog) => Json(catalog.assets().to_vec()).into_response(),
        Err(e) => unavailable(e),
    }
}

/// Un asset par son identifiant
#[utoipa::path(
    get,
    path = "/assets/{id}",
    params(
        ("id" = String, Path, description = "Identifiant de l'asset")
    ),
    responses(
        (status = 200, description = "Asset trouvé", body = Asset),
        (status = 404, description = "Identifiant inconnu", body = ErrorResponse),
        (status = 500, description = "Catalogue illisible", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn get_asset(
    State(provider): State<Arc<CatalogProvider>>,
    Path(id): Path<String>,
) -> Response {
    let catalog = match provider.get() {
        Ok(catalog) => catalog,
        Err(e) => return unavailable(e),
    };

    match catalog.get(&id) {
        Some(asset) => Json(asset.clone()).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Unknown asset '{}'", id)),
    }
}

/// Relit le fichier catalogue
#[utoipa::path(
    post,
    path = "/catalog/reload",
    responses(
        (status = 200, description = "Catalogue rechargé", body = ReloadResponse),
        (status = 500, description = "Catalogue illisible", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn reload_catalog(State(provider): State<Arc<CatalogProvider>>) -> Response {
    match provider.reload() {
        Ok(catalog) => Json(ReloadResponse {
            assets: catalog.len(),
        })
        .into_response(),
        Err(e) => unavailable(e),
    }
}

/// Routeur de l'API catalogue, à monter sous `/api`
pub fn router(provider: Arc<CatalogProvider>) -> Router {
    Router::new()
        .route("/assets", get(get_assets))
        .route("/assets/{id}", get(get_asset))
        .route("/playlist", get(get_playlist))
        .route("/catalog/reload", post(reload_catalog))
        .with_state(provider)
}

#[derive(OpenApi)]
#[openapi(
    paths(get_assets, get_playlist, get_asset, reload_catalog),
    components(schemas(Asset, Media, AssetCatalog, ErrorResponse, ReloadResponse)),
    tags(
        (name = "catalog", description = "Catalogue des assets affichables")
    ),
    info(
        title = "Panel Talk Catalog API",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
