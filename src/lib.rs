//! Navegador de apuntes: snapshot estático de una carpeta de Drive servido
//! como sitio navegable, con búsqueda por subcadena y breadcrumbs.

pub mod api;
pub mod app_state;
pub mod catalog;
pub mod codec;
pub mod collation;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod navigation;
pub mod search;
pub mod sitemap;

pub use catalog::Catalog;
pub use error::{CatalogError, NavigationError};
pub use index::ParentRef;
