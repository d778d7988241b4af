//! Búsqueda por subcadena sobre todos los nodos, carpetas primero.

use serde::Serialize;

use crate::{
    codec::{self, fold},
    collation::sort_folders_first,
    index::TreeIndex,
    models::{KindLabel, NodeIdx},
};

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 50;
pub const MIN_QUERY_CHARS: usize = 2;

/// Destino de los ficheros sin URL y de las carpetas no navegables.
pub const NO_ROUTE: &str = "#";

/// Normalización única para consultas y nombres indexados: sin tildes,
/// `_`/`-` como espacio, otros símbolos fuera, espacios colapsados.
pub fn norm(s: &str) -> String {
    let folded = fold(s);
    let mut out = String::with_capacity(folded.len());
    let mut pending_space = false;
    for c in folded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Entrada del corpus aplanado: un nodo con su destino ya resuelto.
#[derive(Debug, Clone)]
pub struct CorpusEntry {
    pub id: Option<String>,
    pub name: String,
    pub kind: KindLabel,
    pub route: String,
    pub normalized_name: String,
}

impl CorpusEntry {
    pub fn is_folder(&self) -> bool {
        self.kind == KindLabel::Folder
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub kind: KindLabel,
    pub route: String,
    pub is_folder: bool,
}

impl From<&CorpusEntry> for SearchResultEntry {
    fn from(entry: &CorpusEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            kind: entry.kind,
            route: entry.route.clone(),
            is_folder: entry.is_folder(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResultEntry>,
}

/// Aplana el árbol en preorden. Cada carpeta lleva la ruta completa desde la
/// raíz; si algún ancestro (o ella misma) no tiene id, su ruta es `NO_ROUTE`.
pub fn build_corpus(index: &TreeIndex) -> Vec<CorpusEntry> {
    let mut out = Vec::with_capacity(index.len());
    let mut stack: Vec<(NodeIdx, Option<Vec<String>>)> = index
        .roots()
        .iter()
        .rev()
        .map(|idx| (*idx, Some(Vec::new())))
        .collect();

    while let Some((idx, parent_path)) = stack.pop() {
        let node = index.node(idx);
        let route = if node.is_folder() {
            let path = parent_path.and_then(|mut path| {
                codec::segment_of(node).map(|seg| {
                    path.push(seg);
                    path
                })
            });
            let route = path
                .as_deref()
                .map(codec::href)
                .unwrap_or_else(|| NO_ROUTE.to_string());
            for child in node.children().iter().rev() {
                stack.push((*child, path.clone()));
            }
            route
        } else {
            node.external_ref().unwrap_or(NO_ROUTE).to_string()
        };

        out.push(CorpusEntry {
            id: node.id.clone(),
            name: node.name.clone(),
            kind: node.kind_label(),
            route,
            normalized_name: norm(&node.name),
        });
    }

    out
}

/// Coincidencias de `query` (carpetas primero, orden alfabético natural),
/// recortadas a `limit` (nunca más de `MAX_LIMIT`).
pub fn search(corpus: &[CorpusEntry], query: &str, limit: usize) -> SearchResponse {
    let needle = norm(query);
    if needle.chars().count() < MIN_QUERY_CHARS {
        return SearchResponse::default();
    }
    let limit = limit.min(MAX_LIMIT);

    let mut matches: Vec<&CorpusEntry> = corpus
        .iter()
        .filter(|entry| entry.normalized_name.contains(&needle))
        .collect();
    sort_folders_first(&mut matches, |entry| (entry.is_folder(), entry.name.as_str()));

    SearchResponse {
        results: matches
            .into_iter()
            .take(limit)
            .map(SearchResultEntry::from)
            .collect(),
    }
}
