use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    app_state::AppState,
    catalog::CatalogStats,
    error::NavigationError,
    index::ParentRef,
    models::NodeSummary,
    navigation::Resolution,
    search::{SearchResponse, DEFAULT_LIMIT},
    sitemap,
};

/// Prefijo bajo el que se sirven los listados resueltos.
pub const BROWSE_API: &str = "/api/browse";

/// Identificador reservado para pedir el listado raíz por query string.
pub const ROOT_ID: &str = "root";

// --- Parámetros y Respuestas de la API ---

#[derive(Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    limit: Option<String>,
}

#[derive(Deserialize)]
pub struct FolderParams {
    id: Option<String>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    status: &'static str,
    #[serde(flatten)]
    stats: CatalogStats,
}

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/search", get(search_handler))
        .route("/api/folder", get(folder_handler))
        .route(BROWSE_API, get(browse_root_handler))
        .route(&format!("{BROWSE_API}/*segments"), get(browse_handler))
        .route("/api/status", get(status_handler))
        .route("/sitemap.xml", get(sitemap_handler))
        .with_state(app_state)
}

// --- Handlers ---

/// Un límite ausente o no numérico usa el valor por defecto; el tope lo
/// aplica el motor de búsqueda.
fn parse_limit(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(DEFAULT_LIMIT)
}

#[axum::debug_handler]
async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let query = params.q.unwrap_or_default();
    let limit = parse_limit(params.limit.as_deref());
    Json(state.catalog.search(&query, limit))
}

#[axum::debug_handler]
async fn folder_handler(
    State(state): State<AppState>,
    Query(params): Query<FolderParams>,
) -> Json<Vec<NodeSummary>> {
    let parent = match params.id.as_deref() {
        None | Some("") | Some(ROOT_ID) => ParentRef::Root,
        Some(id) => ParentRef::Folder(id),
    };
    Json(state.catalog.list_children(parent))
}

#[axum::debug_handler]
async fn browse_root_handler(State(state): State<AppState>) -> Result<Json<Resolution>, Redirect> {
    resolve(&state, "")
}

#[axum::debug_handler]
async fn browse_handler(
    State(state): State<AppState>,
    Path(segments): Path<String>,
) -> Result<Json<Resolution>, Redirect> {
    resolve(&state, &segments)
}

/// Ruta inválida -> redirección al ancestro válido más cercano.
fn resolve(state: &AppState, path: &str) -> Result<Json<Resolution>, Redirect> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    state.catalog.resolve_path(&segments).map(Json).map_err(|err| {
        let NavigationError::InvalidPath { fallback } = err;
        debug!("Ruta '{path}' inválida, redirigiendo a {fallback}");
        Redirect::temporary(&browse_href(&fallback))
    })
}

fn browse_href(fallback: &str) -> String {
    if fallback == "/" {
        BROWSE_API.to_string()
    } else {
        format!("{BROWSE_API}{fallback}")
    }
}

#[axum::debug_handler]
async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        stats: state.catalog.stats(),
    })
}

#[axum::debug_handler]
async fn sitemap_handler(State(state): State<AppState>) -> impl IntoResponse {
    let xml = sitemap::render(&state.catalog, &state.config.site_url);
    ([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml)
}
