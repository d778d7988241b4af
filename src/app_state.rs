use std::sync::Arc;

use crate::{catalog::Catalog, config::AppConfig};

/// Estado compartido por todos los handlers. El catálogo es de sólo lectura,
/// así que no hace falta ningún lock.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(config: AppConfig, catalog: Catalog) -> Self {
        Self {
            config,
            catalog: Arc::new(catalog),
        }
    }
}
