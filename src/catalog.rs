//! Catálogo inmutable: snapshot cargado + índices derivados.
//!
//! Se construye una vez al arrancar y se comparte por `Arc` entre handlers.
//! El corpus de búsqueda se arma perezosamente en la primera consulta.

use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    codec,
    error::{CatalogError, NavigationError},
    index::{dismantle, ParentRef, TreeIndex},
    models::{Node, NodeIdx, NodeSummary, RawNode},
    navigation::{self, Resolution},
    search::{self, CorpusEntry, SearchResponse},
};

#[derive(Debug)]
pub struct Catalog {
    index: TreeIndex,
    corpus: OnceCell<Vec<CorpusEntry>>,
    loaded_at: DateTime<Utc>,
}

/// Contadores expuestos en `/api/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub nodes: usize,
    pub folders: usize,
    pub files: usize,
    pub unindexable: usize,
    pub loaded_at: DateTime<Utc>,
}

impl Catalog {
    /// Lee y parsea el snapshot de disco. Cualquier fallo es fatal.
    pub fn load(path: &Path, max_depth: usize) -> Result<Self, CatalogError> {
        info!("Cargando snapshot desde {}...", path.display());
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw, max_depth)
    }

    pub fn from_json(json: &str, max_depth: usize) -> Result<Self, CatalogError> {
        let roots = parse_snapshot(json)?;
        Self::from_nodes(roots, max_depth)
    }

    pub fn from_nodes(roots: Vec<RawNode>, max_depth: usize) -> Result<Self, CatalogError> {
        let index = TreeIndex::build(roots, max_depth)?;
        let catalog = Self {
            index,
            corpus: OnceCell::new(),
            loaded_at: Utc::now(),
        };
        let stats = catalog.stats();
        info!(
            "Índice listo: {} nodos ({} carpetas, {} ficheros, {} carpetas sin id).",
            stats.nodes, stats.folders, stats.files, stats.unindexable
        );
        Ok(catalog)
    }

    pub fn index(&self) -> &TreeIndex {
        &self.index
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id)
    }

    /// Corpus aplanado; se construye como mucho una vez por proceso.
    pub fn corpus(&self) -> &[CorpusEntry] {
        self.corpus.get_or_init(|| {
            let corpus = search::build_corpus(&self.index);
            info!("Corpus de búsqueda construido ({} entradas).", corpus.len());
            corpus
        })
    }

    pub fn search(&self, query: &str, limit: usize) -> SearchResponse {
        search::search(self.corpus(), query, limit)
    }

    /// Hijos directos (nunca nietos) de la raíz o de una carpeta. Un id
    /// desconocido o que no es carpeta devuelve un listado vacío.
    pub fn list_children(&self, parent: ParentRef<'_>) -> Vec<NodeSummary> {
        match parent {
            ParentRef::Root => {
                navigation::list_with_hrefs(&self.index, self.index.roots(), Some(&[][..]))
            }
            ParentRef::Folder(id) => {
                let Some(idx) = self.index.lookup(id) else {
                    return Vec::new();
                };
                let node = self.index.node(idx);
                if !node.is_folder() {
                    return Vec::new();
                }
                let segments = self.segments_to(idx);
                let trail: Option<Vec<&str>> = segments
                    .as_ref()
                    .map(|segs| segs.iter().map(String::as_str).collect());
                navigation::list_with_hrefs(&self.index, node.children(), trail.as_deref())
            }
        }
    }

    pub fn resolve_path<S: AsRef<str>>(&self, segments: &[S]) -> Result<Resolution, NavigationError> {
        navigation::resolve_path(&self.index, segments)
    }

    /// Segmentos desde la raíz hasta `idx` (incluido); `None` si algún
    /// ancestro no tiene id.
    pub fn segments_to(&self, idx: NodeIdx) -> Option<Vec<String>> {
        let mut segments = Vec::new();
        let mut cursor = Some(idx);
        while let Some(current) = cursor {
            let node = self.index.node(current);
            segments.push(codec::segment_of(node)?);
            cursor = node.parent;
        }
        segments.reverse();
        Some(segments)
    }

    pub fn stats(&self) -> CatalogStats {
        let nodes = self.index.len();
        let folders = self.index.folder_count();
        CatalogStats {
            nodes,
            folders,
            files: nodes - folders,
            unindexable: self.index.unindexable(),
            loaded_at: self.loaded_at,
        }
    }
}

/// Parsea el snapshot sin el límite de recursión de serde_json: la pila crece
/// bajo demanda y la profundidad la acota `TreeIndex::build`.
fn parse_snapshot(json: &str) -> Result<Vec<RawNode>, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(json);
    de.disable_recursion_limit();
    let roots = Vec::<RawNode>::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    if let Err(err) = de.end() {
        dismantle(roots);
        return Err(err);
    }
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = r#"[
        {"id":"A","name":"1_Basicas","type":"folder","children":[
            {"id":"C","name":"Parciales","type":"folder","children":[
                {"id":"D","name":"p1.pdf","type":"application/pdf","url":"http://x/D"}
            ]}
        ]}
    ]"#;

    #[test]
    fn corpus_is_built_once() {
        let catalog = Catalog::from_json(TREE, 64).unwrap();
        let first = catalog.corpus().as_ptr();
        let second = catalog.corpus().as_ptr();
        assert_eq!(first, second);
        assert_eq!(catalog.corpus().len(), 3);
    }

    #[test]
    fn list_children_of_nested_folder_carries_full_hrefs() {
        let catalog = Catalog::from_json(TREE, 64).unwrap();
        let children = catalog.list_children(ParentRef::Folder("C"));
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].href, "http://x/D");

        let children = catalog.list_children(ParentRef::Folder("A"));
        assert_eq!(children[0].href, "/1-basicas--A/parciales--C");
    }

    #[test]
    fn list_children_of_unknown_or_file_is_empty() {
        let catalog = Catalog::from_json(TREE, 64).unwrap();
        assert!(catalog.list_children(ParentRef::Folder("nope")).is_empty());
        assert!(catalog.list_children(ParentRef::Folder("D")).is_empty());
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = Catalog::from_json(r#"{"not":"an array"}"#, 64).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedSnapshot(_)));
        let err = Catalog::from_json(r#"[{"id":"x"}]"#, 64).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedSnapshot(_)));
    }

    /// Cadena de carpetas anidadas `depth` niveles, escrita como JSON.
    fn chain(depth: usize) -> String {
        let mut json = String::from("[");
        for i in 0..depth {
            json.push_str(&format!(
                r#"{{"id":"n{i}","name":"Nivel {i}","type":"folder","children":["#
            ));
        }
        for _ in 0..depth {
            json.push_str("]}");
        }
        json.push(']');
        json
    }

    #[test]
    fn deeply_nested_snapshot_loads_from_json() {
        let catalog = Catalog::from_json(&chain(300), 1000).unwrap();
        assert_eq!(catalog.stats().nodes, 300);

        let segments: Vec<String> = (0..300).map(|i| format!("nivel-{i}--n{i}")).collect();
        let res = catalog.resolve_path(&segments).unwrap();
        assert_eq!(res.folder.unwrap().id.as_deref(), Some("n299"));
        assert_eq!(res.breadcrumbs.len(), 300);
    }

    #[test]
    fn snapshot_deeper_than_limit_is_too_deep() {
        let err = Catalog::from_json(&chain(300), 64).unwrap_err();
        assert!(matches!(err, CatalogError::TooDeep { name, limit: 64 } if name == "Nivel 64"));
    }

    #[test]
    fn trailing_garbage_is_malformed() {
        let err = Catalog::from_json("[] x", 64).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedSnapshot(_)));
    }

    #[test]
    fn unencodable_ids_get_no_route() {
        let catalog = Catalog::from_json(
            r#"[
                {"id":"-x1","name":"Fisica","type":"folder","children":[
                    {"id":"F1","name":"Fisica II","type":"folder"}
                ]},
                {"id":"a--b","name":"Quimica","type":"folder","children":[
                    {"id":"Q1","name":"q.pdf","type":"application/pdf","url":"http://x/Q1"}
                ]}
            ]"#,
            64,
        )
        .unwrap();
        assert_eq!(catalog.stats().unindexable, 2);

        let results = catalog.search("fisica", 20).results;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.route == search::NO_ROUTE));
        assert_eq!(catalog.search("quimica", 20).results[0].route, search::NO_ROUTE);

        let roots = catalog.list_children(ParentRef::Root);
        assert!(roots.iter().all(|n| n.href == search::NO_ROUTE));
        let children = catalog.list_children(ParentRef::Folder("-x1"));
        assert_eq!(children[0].href, search::NO_ROUTE);
        assert_eq!(catalog.list_children(ParentRef::Folder("a--b"))[0].href, "http://x/Q1");
    }

    #[test]
    fn stats_count_kinds() {
        let stats = Catalog::from_json(TREE, 64).unwrap().stats();
        assert_eq!((stats.nodes, stats.folders, stats.files), (3, 2, 1));
        assert_eq!(stats.unindexable, 0);
    }
}
