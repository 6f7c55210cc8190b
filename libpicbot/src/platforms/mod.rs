//! Publishing boundary
//!
//! The [`Publisher`] trait is everything the posting pipeline needs from a
//! remote server: log in, upload one media attachment, and create a status
//! referencing it. [`Registrar`] covers the one-time application
//! registration. `mastodon` implements both against the Mastodon API;
//! `mock` provides scriptable implementations for tests.
//!
//! # Examples
//!
//! ```no_run
//! use libpicbot::config::Config;
//! use libpicbot::platforms::{mastodon::MastodonPublisher, Publisher};
//! use libpicbot::types::Status;
//!
//! # async fn example(config: Config, image: libpicbot::types::MediaStream) -> libpicbot::error::Result<()> {
//! let mut publisher = MastodonPublisher::new(config.app)?;
//! publisher.authenticate(&config.login).await?;
//!
//! let media_id = publisher.upload_media(image).await?;
//! let post_id = publisher
//!     .create_post(&Status {
//!         text: "Source: some artist".to_string(),
//!         media_ids: vec![media_id],
//!         sensitive: false,
//!     })
//!     .await?;
//! println!("Posted {}", post_id);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::config::LoginConfig;
use crate::error::Result;
use crate::types::{MediaStream, Status};

pub mod mastodon;

// Available outside cfg(test) so integration tests can use it
pub mod mock;

/// A server that images can be published to.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Log in with account credentials. Must succeed before uploading or posting.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` if the server rejects the
    /// credentials or cannot be reached.
    async fn authenticate(&mut self, login: &LoginConfig) -> Result<()>;

    /// Upload an image and return the server's media id.
    ///
    /// Takes ownership of the stream; it is closed when the upload finishes,
    /// successfully or not.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Upload` on failure.
    async fn upload_media(&self, media: MediaStream) -> Result<String>;

    /// Create a status and return its id.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Posting` on failure.
    async fn create_post(&self, status: &Status) -> Result<String>;

    /// Lowercase identifier for logs, e.g. "mastodon"
    fn name(&self) -> &str;
}

/// Client id and secret issued to a newly registered application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// What an application registers itself as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRegistration {
    pub name: String,
    pub scopes: Vec<String>,
    pub website: String,
}

/// A server applications can register with.
#[async_trait]
pub trait Registrar: Send + Sync {
    /// Register `app` on `server`.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Registration` on failure.
    async fn register_application(
        &self,
        server: &str,
        app: &AppRegistration,
    ) -> Result<AppCredentials>;
}
