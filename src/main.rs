//! Binary entry point: read config, start logging, fetch the catalog, then
//! hand the session to the Ratatui event loop.
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use setlist_console::{
    load_catalog, logging, run_app, App, CatalogSource, Config, FileCatalogSource,
    HttpCatalogSource, Session, ShowDetails, StaticCatalogSource,
};
use tracing::info;

/// Record a live setlist from the terminal.
#[derive(Debug, Parser)]
#[command(name = "setlist-console", version, about)]
struct Args {
    /// Albums endpoint to fetch the song catalog from.
    #[arg(long)]
    endpoint: Option<String>,

    /// Config file to read instead of the platform default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Artist pre-filled into the show details.
    #[arg(long)]
    artist: Option<String>,

    /// Read the catalog from a saved `{"data": [...]}` response instead of the network.
    #[arg(long, value_name = "PATH", conflicts_with = "offline")]
    catalog_file: Option<PathBuf>,

    /// Skip the catalog request and start with an empty catalog.
    #[arg(long)]
    offline: bool,

    /// Log at debug level.
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(artist) = args.artist {
        config.default_artist = artist;
    }
    if args.debug {
        config.log_level = "debug".to_string();
    }

    let _guard = logging::init(&config.log_level)?;
    info!(endpoint = %config.endpoint, "starting setlist console");

    let source: Box<dyn CatalogSource> = if let Some(path) = &args.catalog_file {
        Box::new(FileCatalogSource::new(path))
    } else if args.offline {
        Box::new(StaticCatalogSource::default())
    } else {
        Box::new(HttpCatalogSource::new(
            config.endpoint.clone(),
            config.request_timeout(),
        )?)
    };

    let (catalog, fetch_error) = load_catalog(source.as_ref());
    let session = Session::new(catalog);
    let show = ShowDetails::new(config.default_artist.clone());

    let mut app = App::new(session, show);
    if let Some(err) = fetch_error {
        app.report_error(format!("Failed to fetch catalog: {err}"));
    }
    run_app(&mut app)
}
