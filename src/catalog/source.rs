//! Where catalog rows come from: the albums endpoint, a saved response on
//! disk, or a fixed list.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::models::CatalogEntry;

/// Anything that can hand back the raw catalog rows.
pub trait CatalogSource {
    /// Produce every row, live ones included. Called once at start-up.
    fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, FetchError>;
}

/// Envelope returned by the albums endpoint.
#[derive(Deserialize)]
struct CatalogResponse {
    /// Other top-level keys (`error`, `error_message`) are ignored.
    data: Vec<CatalogEntry>,
}

/// Decode a `{"data": [...]}` body into catalog rows.
pub fn parse_catalog_response(body: &str) -> Result<Vec<CatalogEntry>, FetchError> {
    let response: CatalogResponse = serde_json::from_str(body)?;
    Ok(response.data)
}

/// Blocking single-shot GET against the albums endpoint.
pub struct HttpCatalogSource {
    client: Client,
    /// Full URL of the albums endpoint.
    endpoint: String,
}

impl HttpCatalogSource {
    /// Build the client up front so a bad TLS setup fails before the TUI
    /// takes over the terminal.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("setlist-console/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl CatalogSource for HttpCatalogSource {
    fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, FetchError> {
        info!(endpoint = %self.endpoint, "fetching album catalog");
        let response = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text()?;
        debug!(bytes = body.len(), "catalog response received");
        parse_catalog_response(&body)
    }
}

/// A saved `{"data": [...]}` response on disk, read with `--catalog-file`.
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for FileCatalogSource {
    fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, FetchError> {
        info!(path = %self.path.display(), "reading album catalog from file");
        let body = fs::read_to_string(&self.path)?;
        parse_catalog_response(&body)
    }
}

/// Fixed rows, used for `--offline` runs and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalogSource {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }
}

impl CatalogSource for StaticCatalogSource {
    fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, FetchError> {
        Ok(self.entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;
    use crate::catalog::load_catalog;

    /// Answer exactly one request with `response` on a loopback port.
    fn serve_once(response: &'static str) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 2048];
            let _ = stream.read(&mut buf);
            stream.write_all(response.as_bytes()).unwrap();
        });
        (format!("http://{addr}/api/v2/albums.json"), handle)
    }

    #[test]
    fn unreachable_endpoint_is_a_transport_error() {
        let source = HttpCatalogSource::new(
            "http://127.0.0.1:1/api/v2/albums.json",
            Duration::from_secs(2),
        )
        .unwrap();
        let (catalog, err) = load_catalog(&source);
        assert!(catalog.is_empty());
        assert!(matches!(err, Some(FetchError::Transport(_))));
    }

    #[test]
    fn error_status_is_reported() {
        let (url, server) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let source = HttpCatalogSource::new(url, Duration::from_secs(5)).unwrap();
        let err = source.fetch_catalog().unwrap_err();
        assert!(matches!(err, FetchError::Status(503)));
        server.join().unwrap();
    }

    #[test]
    fn successful_response_is_decoded() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 69\r\nConnection: close\r\n\r\n{\"data\":[{\"album_title\":\"K.G.\",\"song_name\":\"Automation\",\"islive\":0}]}",
        );
        let source = HttpCatalogSource::new(url, Duration::from_secs(5)).unwrap();
        let (catalog, err) = load_catalog(&source);
        assert!(err.is_none());
        assert_eq!(catalog.songs("K.G."), ["Automation"]);
        server.join().unwrap();
    }

    #[test]
    fn missing_catalog_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileCatalogSource::new(dir.path().join("albums.json"));
        let (catalog, err) = load_catalog(&source);
        assert!(catalog.is_empty());
        assert!(matches!(err, Some(FetchError::Io(_))));
    }

    #[test]
    fn catalog_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("albums.json");
        fs::write(
            &path,
            r#"{"data":[{"album_title":"Omnium Gatherum","song_name":"The Dripping Tap","islive":0}]}"#,
        )
        .unwrap();
        let (catalog, err) = load_catalog(&FileCatalogSource::new(&path));
        assert!(err.is_none());
        assert_eq!(catalog.songs("Omnium Gatherum"), ["The Dripping Tap"]);

        fs::write(&path, "not json").unwrap();
        let (catalog, err) = load_catalog(&FileCatalogSource::new(&path));
        assert!(catalog.is_empty());
        assert!(matches!(err, Some(FetchError::Parse(_))));
    }

    #[test]
    fn parses_data_envelope() {
        let body = r#"{"error":false,"data":[
            {"album_title":"Flying Microtonal Banana","song_name":"Rattlesnake","islive":0,"release_date":"2017-02-24"},
            {"album_title":"Live in Milwaukee '19","song_name":"Rattlesnake","islive":1}
        ]}"#;
        let rows = parse_catalog_response(body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].song_name, "Rattlesnake");
        assert!(!rows[0].is_live);
        assert!(rows[1].is_live);
    }

    #[test]
    fn malformed_body_is_a_parse_error() {
        assert!(matches!(
            parse_catalog_response("<html>502</html>"),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(
            parse_catalog_response(r#"{"rows": []}"#),
            Err(FetchError::Parse(_))
        ));
    }
}
