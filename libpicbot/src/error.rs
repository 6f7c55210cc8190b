//! Error types for fedi-picbot

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PicbotError>;

#[derive(Error, Debug)]
pub enum PicbotError {
    #[error("Invalid usage: {0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

impl PicbotError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PicbotError::Usage(_) => 3,
            PicbotError::Platform(PlatformError::Authentication(_)) => 2,
            PicbotError::Platform(_) => 1,
            PicbotError::Config(_) => 1,
            PicbotError::Catalog(_) => 1,
            PicbotError::Resource(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] ini::ParseError),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to open catalog {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read catalog {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog {} has no entries to choose from", path.display())]
    EmptySelection { path: PathBuf },

    #[error("Line {line} is not a valid record: expected 3 tab-separated fields, found {fields}")]
    MalformedRecord { line: usize, fields: usize },

    #[error("Line {line} is not valid UTF-8")]
    InvalidEncoding { line: usize },

    #[error("Line {line} has an invalid sensitive flag {value:?}: expected \"true\" or \"false\"")]
    InvalidBooleanField { line: usize, value: String },
}

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Unable to fetch image {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Unable to fetch image {url}, received status {status}")]
    Status { url: String, status: String },

    #[error("Unable to open image {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Media upload failed: {0}")]
    Upload(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Registration failed: {0}")]
    Registration(String),
}
