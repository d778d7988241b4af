//! Errores tipados del catálogo y de la navegación.

use thiserror::Error;

/// Fallos al cargar o indexar un snapshot. Todos son fatales en el arranque.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("No se pudo leer el snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot mal formado: {0}")]
    MalformedSnapshot(#[from] serde_json::Error),

    #[error("Id duplicado en el snapshot: {id}")]
    DuplicateId { id: String },

    #[error("El árbol supera la profundidad máxima ({limit}) en el nodo '{name}'")]
    TooDeep { name: String, limit: usize },
}

/// Resultado de una ruta que no es un camino real dentro del árbol.
/// `fallback` es el href del ancestro válido más cercano.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("Ruta inválida (redirigir a {fallback})")]
    InvalidPath { fallback: String },
}
