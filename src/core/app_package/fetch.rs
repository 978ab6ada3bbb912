use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::fs;
use std::path::PathBuf;
use url::Url;

/// Where a document locator points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Remote(Url),
    Local(PathBuf),
}

/// Error types for document retrieval.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP status {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{0}' is not a valid file URL")]
    InvalidFileUrl(String),
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        let code = match err {
            FetchError::Http { .. } | FetchError::Status { .. } => "AP-FETCH-001",
            FetchError::Io { .. } => "AP-FETCH-002",
            FetchError::InvalidFileUrl(_) => "AP-FETCH-003",
        };
        AppError::with_source(ErrorCategory::FetchError, err.to_string(), Box::new(err))
            .with_code(code)
    }
}

/// Map a locator to a remote URL or a local path.
///
/// Only http(s) is fetched over the network. `file://` URLs become paths, any other scheme
/// falls back to its path component, and strings that are not URLs at all are paths.
pub fn resolve_location(locator: &str) -> Result<Location, FetchError> {
    let url = match Url::parse(locator) {
        Ok(url) => url,
        Err(_) => return Ok(Location::Local(PathBuf::from(locator))),
    };

    match url.scheme() {
        "http" | "https" => Ok(Location::Remote(url)),
        "file" => url
            .to_file_path()
            .map(Location::Local)
            .map_err(|_| FetchError::InvalidFileUrl(locator.to_string())),
        // Windows drive letters parse as one-letter schemes.
        scheme if scheme.len() == 1 => Ok(Location::Local(PathBuf::from(locator))),
        _ => Ok(Location::Local(PathBuf::from(url.path()))),
    }
}

/// Retrieve the document text behind `locator`.
pub fn fetch_document(locator: &str) -> Result<String, AppError> {
    let text = match resolve_location(locator)? {
        Location::Remote(url) => fetch_remote(&url)?,
        Location::Local(path) => {
            tracing::debug!("reading application package from {}", path.display());
            fs::read_to_string(&path).map_err(|source| FetchError::Io { path, source })?
        }
    };
    Ok(text)
}

fn fetch_remote(url: &Url) -> Result<String, FetchError> {
    tracing::debug!("fetching application package from {}", url);
    let response = reqwest::blocking::get(url.clone()).map_err(|source| FetchError::Http {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().map_err(|source| FetchError::Http {
        url: url.to_string(),
        source,
    })
}
