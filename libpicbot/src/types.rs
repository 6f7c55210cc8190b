//! Core types for fedi-picbot

use tokio::io::AsyncRead;

/// An open, exclusively owned stream of image bytes.
///
/// Dropping the stream closes the underlying file or releases the buffered
/// response body.
pub type MediaStream = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// One candidate image entry from the catalog.
///
/// Catalog lines have the form `<reference>\t<sensitive>\t<attribution>`.
/// Fields are kept exactly as split; surrounding spaces are not trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    /// Absolute `http://`/`https://` URL or a path relative to the images directory
    pub reference: String,
    /// Whether the post should be marked sensitive
    pub sensitive: bool,
    /// Free-text credit line, everything after the second tab
    pub attribution: String,
}

/// A catalog record whose reference has been opened for reading.
pub struct ResolvedResource {
    /// The URL or joined local path the bytes come from
    pub location: String,
    /// The image bytes, consumed once by the upload
    pub stream: MediaStream,
    pub attribution: String,
    pub sensitive: bool,
}

impl ResolvedResource {
    /// The status text published alongside the image.
    pub fn caption(&self) -> String {
        caption_for(&self.attribution)
    }
}

impl std::fmt::Debug for ResolvedResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedResource")
            .field("location", &self.location)
            .field("attribution", &self.attribution)
            .field("sensitive", &self.sensitive)
            .finish_non_exhaustive()
    }
}

/// Build the caption for an attribution line.
pub fn caption_for(attribution: &str) -> String {
    format!("Source: {}", attribution)
}

/// A status ready to be created on the remote server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub media_ids: Vec<String>,
    pub sensitive: bool,
}
