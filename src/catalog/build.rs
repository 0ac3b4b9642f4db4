use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::error::FetchError;
use crate::models::{Catalog, CatalogEntry};

use super::source::CatalogSource;

/// Drop live recordings and group the remaining songs by album. Songs keep
/// the order they first appear in; repeats within an album are kept as the
/// source lists them.
pub fn build_catalog(entries: Vec<CatalogEntry>) -> Catalog {
    let mut albums: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for entry in entries.into_iter().filter(|e| !e.is_live) {
        albums
            .entry(entry.album_title)
            .or_default()
            .push(entry.song_name);
    }
    Catalog::from_map(albums)
}

/// Fetch once and build. A failed fetch yields an empty catalog together
/// with the error so the caller can show it.
pub fn load_catalog(source: &dyn CatalogSource) -> (Catalog, Option<FetchError>) {
    match source.fetch_catalog() {
        Ok(entries) => {
            let total = entries.len();
            let catalog = build_catalog(entries);
            info!(
                rows = total,
                albums = catalog.album_count(),
                "album catalog loaded"
            );
            (catalog, None)
        }
        Err(err) => {
            warn!(error = %err, "album catalog unavailable, continuing with an empty catalog");
            (Catalog::default(), Some(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalogSource;

    fn row(album: &str, song: &str, live: bool) -> CatalogEntry {
        CatalogEntry {
            album_title: album.to_string(),
            song_name: song.to_string(),
            is_live: live,
        }
    }

    struct FailingSource;

    impl CatalogSource for FailingSource {
        fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, FetchError> {
            Err(FetchError::Status(503))
        }
    }

    #[test]
    fn live_entries_are_dropped() {
        let catalog = build_catalog(vec![
            row("Live at Levitation", "Robot Stop", true),
            row("Nonagon Infinity", "Robot Stop", false),
        ]);
        assert_eq!(catalog.albums().collect::<Vec<_>>(), ["Nonagon Infinity"]);
    }

    #[test]
    fn albums_sorted_songs_in_first_seen_order() {
        let catalog = build_catalog(vec![
            row("Polygondwanaland", "Crumbling Castle", false),
            row("I'm In Your Mind Fuzz", "I'm In Your Mind", false),
            row("Polygondwanaland", "Polygondwanaland", false),
            row("Flying Microtonal Banana", "Rattlesnake", false),
            row("Polygondwanaland", "The Castle In The Air", false),
        ]);
        assert_eq!(
            catalog.albums().collect::<Vec<_>>(),
            [
                "Flying Microtonal Banana",
                "I'm In Your Mind Fuzz",
                "Polygondwanaland"
            ]
        );
        assert_eq!(
            catalog.songs("Polygondwanaland"),
            ["Crumbling Castle", "Polygondwanaland", "The Castle In The Air"]
        );
        assert!(catalog.songs("Unknown").is_empty());
    }

    #[test]
    fn failed_fetch_falls_back_to_empty() {
        let (catalog, err) = load_catalog(&FailingSource);
        assert!(catalog.is_empty());
        assert!(matches!(err, Some(FetchError::Status(503))));
    }

    #[test]
    fn static_source_loads() {
        let source = StaticCatalogSource::new(vec![row("K.G.", "Automation", false)]);
        let (catalog, err) = load_catalog(&source);
        assert!(err.is_none());
        assert_eq!(catalog.songs("K.G."), ["Automation"]);
    }
}
