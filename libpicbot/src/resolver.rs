//! Resolution of catalog references into readable image streams
//!
//! A reference starting with `http://` or `https://` (exact, case-sensitive
//! prefix) is fetched over HTTP. Anything else is treated as a path relative
//! to the images directory; no other schemes are recognised.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::{ResourceError, Result};
use crate::types::{CatalogRecord, MediaStream, ResolvedResource};

const REMOTE_PREFIXES: [&str; 2] = ["http://", "https://"];

/// Where a catalog reference points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocation {
    Remote(String),
    Local(PathBuf),
}

impl ResourceLocation {
    /// Classify `reference`, joining local references onto `images_dir`.
    pub fn classify(reference: &str, images_dir: &Path) -> Self {
        if REMOTE_PREFIXES
            .iter()
            .any(|prefix| reference.starts_with(prefix))
        {
            ResourceLocation::Remote(reference.to_string())
        } else {
            ResourceLocation::Local(images_dir.join(reference))
        }
    }

    /// The location as shown to the operator.
    pub fn display(&self) -> String {
        match self {
            ResourceLocation::Remote(url) => url.clone(),
            ResourceLocation::Local(path) => path.display().to_string(),
        }
    }
}

/// The user agent sent with every HTTP request.
pub fn user_agent() -> String {
    format!("{} v{}", crate::APP_NAME, env!("CARGO_PKG_VERSION"))
}

/// Build the HTTP client shared by image fetches and authentication.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(user_agent())
        .build()
        .map_err(|e| ResourceError::Client(e.to_string()).into())
}

/// Opens catalog references as image streams.
pub struct Resolver {
    client: Client,
    images_dir: PathBuf,
}

impl Resolver {
    /// Create a resolver for local images under `images_dir`.
    pub fn new(images_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::with_client(http_client()?, images_dir))
    }

    pub fn with_client(client: Client, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            images_dir: images_dir.into(),
        }
    }

    /// Open the image `record` refers to.
    ///
    /// The returned stream is owned by the caller and closed when dropped.
    pub async fn resolve(&self, record: CatalogRecord) -> Result<ResolvedResource> {
        let location = ResourceLocation::classify(&record.reference, &self.images_dir);
        let stream = match &location {
            ResourceLocation::Remote(url) => self.fetch(url).await?,
            ResourceLocation::Local(path) => open_local(path).await?,
        };

        Ok(ResolvedResource {
            location: location.display(),
            stream,
            attribution: record.attribution,
            sensitive: record.sensitive,
        })
    }

    async fn fetch(&self, url: &str) -> Result<MediaStream> {
        debug!("Fetching remote image {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ResourceError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if response.status() != StatusCode::OK {
            return Err(ResourceError::Status {
                url: url.to_string(),
                status: response.status().to_string(),
            }
            .into());
        }

        let body = response.bytes().await.map_err(|e| ResourceError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        debug!("Fetched {} bytes from {}", body.len(), url);

        Ok(Box::new(Cursor::new(body)))
    }
}

async fn open_local(path: &Path) -> Result<MediaStream> {
    debug!("Opening local image {}", path.display());

    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| ResourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Box::new(file))
}
