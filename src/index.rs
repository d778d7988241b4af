//! Construcción del índice en memoria a partir del snapshot.
//!
//! Un único recorrido en preorden (con pila explícita, sin recursión) produce:
//!   1. El arena de nodos con sus relaciones padre/hijo.
//!   2. `by_id`: id -> nodo.
//!   3. Los ids de hijos directos de cada carpeta (y de la raíz sintética),
//!      usados para validar que una ruta sea un camino real.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::{
    codec,
    error::CatalogError,
    models::{Node, NodeIdx, NodeKind, RawNode},
};

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Padre en una consulta de parentesco. La raíz sintética no es un id, así
/// que nunca puede chocar con uno real.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef<'a> {
    Root,
    Folder(&'a str),
}

#[derive(Debug, Default)]
pub struct TreeIndex {
    nodes: Vec<Node>,
    roots: Vec<NodeIdx>,
    by_id: HashMap<String, NodeIdx>,
    root_child_ids: HashSet<String>,
    child_ids_by_parent: HashMap<String, HashSet<String>>,
    unindexable: usize,
}

impl TreeIndex {
    pub fn build(roots: Vec<RawNode>, max_depth: usize) -> Result<Self, CatalogError> {
        let mut index = TreeIndex::default();
        let mut stack: Vec<(RawNode, Option<NodeIdx>, usize)> =
            roots.into_iter().rev().map(|raw| (raw, None, 1)).collect();

        while let Some((raw, parent, depth)) = stack.pop() {
            if depth > max_depth {
                let name = raw.name.clone();
                dismantle(stack.into_iter().map(|(raw, _, _)| raw).chain([raw]));
                return Err(CatalogError::TooDeep {
                    name,
                    limit: max_depth,
                });
            }

            let idx = NodeIdx(index.nodes.len());
            let is_folder = raw.is_folder();

            if let Some(id) = &raw.id {
                if index.by_id.insert(id.clone(), idx).is_some() {
                    let id = id.clone();
                    dismantle(stack.into_iter().map(|(raw, _, _)| raw).chain([raw]));
                    return Err(CatalogError::DuplicateId { id });
                }
                index.register_child(parent, id);
                if is_folder && !codec::round_trips(&raw.name, id) {
                    warn!(
                        "Carpeta '{}' con id '{}' que no se puede codificar en una ruta; no será navegable.",
                        raw.name, id
                    );
                    index.unindexable += 1;
                }
            } else if is_folder {
                warn!(
                    "Carpeta sin id '{}': no será navegable por ruta.",
                    raw.name
                );
                index.unindexable += 1;
            }

            let children = raw.children.unwrap_or_default();
            let kind = if is_folder {
                if let Some(id) = &raw.id {
                    index.child_ids_by_parent.entry(id.clone()).or_default();
                }
                for child in children.into_iter().rev() {
                    stack.push((child, Some(idx), depth + 1));
                }
                NodeKind::Folder {
                    children: Vec::new(),
                    external_ref: raw.url,
                }
            } else {
                if !children.is_empty() {
                    warn!(
                        "El fichero '{}' trae {} hijos; se ignoran.",
                        raw.name,
                        children.len()
                    );
                    dismantle(children);
                }
                NodeKind::File {
                    mime_type: raw.node_type,
                    external_ref: raw.url,
                }
            };

            index.nodes.push(Node {
                id: raw.id,
                name: raw.name,
                kind,
                parent,
            });

            match parent {
                Some(p) => {
                    if let NodeKind::Folder { children, .. } = &mut index.nodes[p.0].kind {
                        children.push(idx);
                    }
                }
                None => index.roots.push(idx),
            }
        }

        Ok(index)
    }

    /// Registra `id` como hijo directo de `parent`. Los hijos de una carpeta
    /// sin id no quedan registrados bajo ningún padre.
    fn register_child(&mut self, parent: Option<NodeIdx>, id: &str) {
        match parent {
            None => {
                self.root_child_ids.insert(id.to_string());
            }
            Some(p) => {
                if let Some(parent_id) = &self.nodes[p.0].id {
                    self.child_ids_by_parent
                        .entry(parent_id.clone())
                        .or_default()
                        .insert(id.to_string());
                }
            }
        }
    }

    pub fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIdx, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIdx(i), n))
    }

    pub fn roots(&self) -> &[NodeIdx] {
        &self.roots
    }

    pub fn lookup(&self, id: &str) -> Option<NodeIdx> {
        self.by_id.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.lookup(id).map(|idx| self.node(idx))
    }

    /// `true` sólo si `child_id` es hijo *directo* de `parent`.
    pub fn is_child_of(&self, parent: ParentRef<'_>, child_id: &str) -> bool {
        match parent {
            ParentRef::Root => self.root_child_ids.contains(child_id),
            ParentRef::Folder(parent_id) => self
                .child_ids_by_parent
                .get(parent_id)
                .is_some_and(|set| set.contains(child_id)),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn folder_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_folder()).count()
    }

    /// Carpetas sin id, o con un id que no sobrevive a la codificación del
    /// segmento, encontradas durante la construcción.
    pub fn unindexable(&self) -> usize {
        self.unindexable
    }
}

/// Libera subárboles sin recursión: cada nodo entrega sus hijos a la pila
/// antes de soltarse, así el `Drop` nunca anida.
pub fn dismantle(nodes: impl IntoIterator<Item = RawNode>) {
    let mut pending: Vec<RawNode> = nodes.into_iter().collect();
    while let Some(mut node) = pending.pop() {
        if let Some(children) = node.children.take() {
            pending.extend(children);
        }
    }
}
