//! Carga y gestión de configuración de la aplicación.

use std::{env, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use url::Url;

use crate::index::DEFAULT_MAX_DEPTH;

/// Configuración completa de la aplicación.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub snapshot_path: PathBuf,
    pub server_addr: String,
    pub site_url: Url,
    pub frontend_dir: PathBuf,
    pub max_tree_depth: usize,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env`, pero leyendo de cualquier fuente clave -> valor.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let snapshot_path = lookup("SNAPSHOT_PATH")
            .unwrap_or_else(|| "data/drive-tree.json".to_string())
            .into();

        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:3322".to_string());

        let site_url_str =
            lookup("SITE_URL").unwrap_or_else(|| "http://localhost:3322/".to_string());
        let site_url = Url::parse(&site_url_str)
            .with_context(|| format!("SITE_URL no es una URL válida: {site_url_str}"))?;

        let frontend_dir = lookup("FRONTEND_DIR")
            .unwrap_or_else(|| "frontend".to_string())
            .into();

        let max_tree_depth = match lookup("MAX_TREE_DEPTH") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("MAX_TREE_DEPTH no es un número: {raw}"))?,
            None => DEFAULT_MAX_DEPTH,
        };
        if max_tree_depth == 0 {
            return Err(anyhow!("MAX_TREE_DEPTH debe ser al menos 1"));
        }

        Ok(Self {
            snapshot_path,
            server_addr,
            site_url,
            frontend_dir,
            max_tree_depth,
        })
    }
}
