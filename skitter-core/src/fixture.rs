// Canned link graphs for offline crawls

use skitter_scanner::{FixtureFetcher, FixturePage};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Root of the bundled demo site.
pub const DEMO_ROOT: &str = "http://golang.org/";
/// Depth the demo is crawled with unless told otherwise.
pub const DEMO_DEPTH: usize = 4;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fixture {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Fixture {0} contains no pages")]
    Empty(PathBuf),
}

/// The four-page documentation site used by `skitter demo`.
///
/// `/cmd/` is linked but has no page, and every page links back to the root,
/// so a crawl of it exercises both not-found reporting and dedup.
pub fn demo_pages() -> HashMap<String, FixturePage> {
    HashMap::from([
        (
            "http://golang.org/".to_string(),
            FixturePage::new(
                "The Go Programming Language",
                &["http://golang.org/pkg/", "http://golang.org/cmd/"],
            ),
        ),
        (
            "http://golang.org/pkg/".to_string(),
            FixturePage::new(
                "Packages",
                &[
                    "http://golang.org/",
                    "http://golang.org/cmd/",
                    "http://golang.org/pkg/fmt/",
                    "http://golang.org/pkg/os/",
                ],
            ),
        ),
        (
            "http://golang.org/pkg/fmt/".to_string(),
            FixturePage::new(
                "Package fmt",
                &["http://golang.org/", "http://golang.org/pkg/"],
            ),
        ),
        (
            "http://golang.org/pkg/os/".to_string(),
            FixturePage::new(
                "Package os",
                &["http://golang.org/", "http://golang.org/pkg/"],
            ),
        ),
    ])
}

pub fn demo_fetcher() -> FixtureFetcher {
    FixtureFetcher::new(demo_pages())
}

/// Parses a JSON object mapping identifiers to `{ "body": .., "links": [..] }`.
pub fn parse_fixture(json: &str) -> Result<HashMap<String, FixturePage>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Loads a JSON fixture file into a fetcher.
pub fn load_fixture(path: &Path) -> Result<FixtureFetcher, FixtureError> {
    let content = fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let pages = parse_fixture(&content).map_err(|source| FixtureError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if pages.is_empty() {
        return Err(FixtureError::Empty(path.to_path_buf()));
    }

    Ok(FixtureFetcher::new(pages))
}
