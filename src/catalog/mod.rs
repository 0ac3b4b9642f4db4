//! Catalog loading split across logical submodules.

mod build;
mod source;

pub use build::{build_catalog, load_catalog};
pub use source::{
    parse_catalog_response, CatalogSource, FileCatalogSource, HttpCatalogSource,
    StaticCatalogSource,
};
