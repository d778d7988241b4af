//! Resolución de rutas `/<seg>/<seg>/...` a una carpeta del árbol.
//!
//! Cada segmento debe ser hijo directo del anterior: una cadena de ids que
//! existen pero no están anidados entre sí se rechaza entera.

use serde::Serialize;
use tracing::debug;

use crate::{
    codec::{self, clean_name, decode_segment},
    collation::sort_folders_first,
    error::NavigationError,
    index::{ParentRef, TreeIndex},
    models::{NodeIdx, NodeSummary},
    search::NO_ROUTE,
};

pub const ROOT_TITLE: &str = "Inicio";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub name: String,
    pub href: String,
}

/// Carpeta resuelta (o la raíz) con su contenido listo para mostrar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// `None` significa el listado raíz.
    pub folder: Option<NodeSummary>,
    pub title: String,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub back_href: String,
    pub children: Vec<NodeSummary>,
}

/// Recorre los segmentos validando el parentesco en cada paso.
pub fn resolve_path<S: AsRef<str>>(
    index: &TreeIndex,
    segments: &[S],
) -> Result<Resolution, NavigationError> {
    let mut current: Option<NodeIdx> = None;
    let mut trail: Vec<&str> = Vec::with_capacity(segments.len());
    let mut breadcrumbs = Vec::with_capacity(segments.len());

    for segment in segments {
        let segment = segment.as_ref();
        let id = decode_segment(segment);
        let parent = match current {
            None => ParentRef::Root,
            // Sólo se avanza por carpetas con id, así que siempre hay id.
            Some(idx) => ParentRef::Folder(index.node(idx).id.as_deref().unwrap_or_default()),
        };

        let resolved = index
            .is_child_of(parent, id)
            .then(|| index.lookup(id))
            .flatten()
            .filter(|idx| index.node(*idx).is_folder());

        let Some(idx) = resolved else {
            let fallback = codec::href(&trail);
            debug!("Segmento '{segment}' inválido; ancestro válido: {fallback}");
            return Err(NavigationError::InvalidPath { fallback });
        };

        trail.push(segment);
        breadcrumbs.push(Breadcrumb {
            name: clean_name(&index.node(idx).name),
            href: codec::href(&trail),
        });
        current = Some(idx);
    }

    let back_href = if trail.len() <= 1 {
        "/".to_string()
    } else {
        codec::href(&trail[..trail.len() - 1])
    };

    let (folder, title, child_idxs) = match current {
        None => (None, ROOT_TITLE.to_string(), index.roots()),
        Some(idx) => {
            let node = index.node(idx);
            (
                Some(NodeSummary::from_node(node, codec::href(&trail))),
                clean_name(&node.name),
                node.children(),
            )
        }
    };

    Ok(Resolution {
        folder,
        title,
        breadcrumbs,
        back_href,
        children: list_with_hrefs(index, child_idxs, Some(trail.as_slice())),
    })
}

/// Resúmenes ordenados de `children`, con el href de cada uno relativo a `trail`.
/// Sin `trail` (carpeta no navegable) las subcarpetas quedan sin destino.
pub fn list_with_hrefs(
    index: &TreeIndex,
    children: &[NodeIdx],
    trail: Option<&[&str]>,
) -> Vec<NodeSummary> {
    let mut out: Vec<NodeSummary> = children
        .iter()
        .map(|idx| {
            let node = index.node(*idx);
            let href = if node.is_folder() {
                trail
                    .zip(codec::segment_of(node))
                    .map(|(trail, seg)| {
                        let mut path: Vec<&str> = trail.to_vec();
                        path.push(&seg);
                        codec::href(&path)
                    })
                    .unwrap_or_else(|| NO_ROUTE.to_string())
            } else {
                node.external_ref().unwrap_or(NO_ROUTE).to_string()
            };
            NodeSummary::from_node(node, href)
        })
        .collect();
    sort_folders_first(&mut out, |s| (s.is_folder, s.name.as_str()));
    out
}
