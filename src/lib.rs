//! Live setlist recording console.
//!
//! The recorder (`Session`) is plain state plus command methods and has no
//! terminal dependency, so the binary and the tests drive the same code.
pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod recorder;
pub mod timecode;
pub mod timeline;
pub mod ui;

/// Catalog loading. `main.rs` picks a source and hands it to `load_catalog`.
pub use catalog::{
    build_catalog, load_catalog, parse_catalog_response, CatalogSource, FileCatalogSource,
    HttpCatalogSource, StaticCatalogSource,
};
pub use config::Config;
/// `FetchError` stays with the catalog; `SetlistError` comes from recorder commands.
pub use error::{FetchError, SetlistError};

/// Plain data shared by every layer.
pub use models::{
    Catalog, CatalogEntry, EntryEdit, EntryMetadata, SetlistEntry, ShowDetails, Transition,
};
/// The in-memory recorder the UI drives.
pub use recorder::{RecorderState, Session};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
