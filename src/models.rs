//! Modelos de dominio: nodos del árbol de Drive (carpetas y ficheros).

use serde::{Deserialize, Serialize};

/// MIME reservado que Drive usa para las carpetas.
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Nodo tal como llega en el snapshot JSON generado por el scraper.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    /// "folder", "file" o un MIME type.
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, alias = "externalRef")]
    pub url: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<RawNode>>,
}

impl RawNode {
    pub fn is_folder(&self) -> bool {
        is_folder_type(&self.node_type)
    }
}

pub fn is_folder_type(t: &str) -> bool {
    t == "folder" || t == FOLDER_MIME
}

/// Posición de un nodo dentro del arena del índice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub usize);

/// Variante carpeta | fichero con los campos propios de cada una.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Folder {
        children: Vec<NodeIdx>,
        external_ref: Option<String>,
    },
    File {
        mime_type: String,
        external_ref: Option<String>,
    },
}

/// Nodo ya indexado. Inmutable una vez construido el catálogo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: Option<String>,
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeIdx>,
}

impl Node {
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub fn external_ref(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Folder { external_ref, .. } | NodeKind::File { external_ref, .. } => {
                external_ref.as_deref()
            }
        }
    }

    /// Hijos directos; vacío para ficheros.
    pub fn children(&self) -> &[NodeIdx] {
        match &self.kind {
            NodeKind::Folder { children, .. } => children,
            NodeKind::File { .. } => &[],
        }
    }

    pub fn kind_label(&self) -> KindLabel {
        if self.is_folder() {
            KindLabel::Folder
        } else {
            KindLabel::File
        }
    }
}

/// Discriminador serializable ("folder" | "file").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KindLabel {
    Folder,
    File,
}

/// Vista de un nodo sin hijos, para listados perezosos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub kind: KindLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub is_folder: bool,
    pub href: String,
}

impl NodeSummary {
    pub fn from_node(node: &Node, href: String) -> Self {
        let mime_type = match &node.kind {
            NodeKind::File { mime_type, .. } => Some(mime_type.clone()),
            NodeKind::Folder { .. } => None,
        };
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            kind: node.kind_label(),
            mime_type,
            url: node.external_ref().map(str::to_string),
            is_folder: node.is_folder(),
            href,
        }
    }
}
