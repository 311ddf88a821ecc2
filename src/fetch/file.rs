// src/fetch/file.rs
// =============================================================================
// Fetches file:// addresses from the local disk.
//
// Files have no HTTP status, so we make one up:
// - readable  => 200
// - missing   => 404
// - any other failure (permissions, it's a directory...) => error marker
//
// There are never redirects here.
// =============================================================================

use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;
use url::Url;

use super::{FetchOutcome, FetchStatus};

/// Extensions we parse for links. Files without an extension count too,
/// plenty of static sites have "about" next to "about.html".
const HTML_EXTENSIONS: [&str; 3] = ["html", "htm", "xhtml"];

pub(super) async fn fetch(address: &Url) -> FetchOutcome {
    let path = match address.to_file_path() {
        Ok(path) => path,
        Err(()) => {
            return FetchOutcome::failed(address.clone(), Vec::new(), "not a local file path");
        }
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let body = looks_like_html(&path).then(|| String::from_utf8_lossy(&bytes).into_owned());
            FetchOutcome {
                status: FetchStatus::Code(200),
                final_url: address.clone(),
                redirects: Vec::new(),
                body,
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => FetchOutcome {
            status: FetchStatus::Code(404),
            final_url: address.clone(),
            redirects: Vec::new(),
            body: None,
        },
        Err(e) => {
            warn!("Could not read {}: {}", path.display(), e);
            FetchOutcome::failed(address.clone(), Vec::new(), e.to_string())
        }
    }
}

fn looks_like_html(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => HTML_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => true,
    }
}
