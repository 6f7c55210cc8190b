//! Mock platform implementation for testing
//!
//! A configurable publisher and registrar that record what they were asked
//! to do and fail on demand, so the posting pipeline and the CLI glue can be
//! tested without a live server.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncReadExt;

use crate::config::LoginConfig;
use crate::error::{PlatformError, Result};
use crate::platforms::{AppCredentials, AppRegistration, Publisher, Registrar};
use crate::types::{MediaStream, Status};

/// Configuration for mock publisher behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name (e.g., "mock")
    pub name: String,

    /// Error to return from authenticate, if any
    pub auth_error: Option<String>,

    /// Error to return from upload_media, if any
    pub upload_error: Option<String>,

    /// Error to return from create_post, if any
    pub post_error: Option<String>,

    /// Every call made, in order ("authenticate", "upload", "post")
    pub calls: Arc<Mutex<Vec<String>>>,

    /// Bytes read from each uploaded stream
    pub uploads: Arc<Mutex<Vec<Vec<u8>>>>,

    /// Statuses that have been created
    pub posts: Arc<Mutex<Vec<Status>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            auth_error: None,
            upload_error: None,
            post_error: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            uploads: Arc::new(Mutex::new(Vec::new())),
            posts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock publisher for testing
pub struct MockPublisher {
    config: MockConfig,
    authenticated: bool,
}

impl MockPublisher {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            authenticated: false,
        }
    }

    /// A publisher on which every step succeeds
    pub fn success() -> Self {
        Self::new(MockConfig::default())
    }

    pub fn auth_failure(error: &str) -> Self {
        Self::new(MockConfig {
            auth_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    pub fn upload_failure(error: &str) -> Self {
        Self::new(MockConfig {
            upload_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    pub fn post_failure(error: &str) -> Self {
        Self::new(MockConfig {
            post_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.config.calls.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<Vec<u8>> {
        self.config.uploads.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<Status> {
        self.config.posts.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.config.calls.lock().unwrap().push(call.to_string());
    }

    fn ensure_authenticated(&self) -> std::result::Result<(), String> {
        if self.authenticated {
            Ok(())
        } else {
            Err("Not authenticated".to_string())
        }
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn authenticate(&mut self, _login: &LoginConfig) -> Result<()> {
        self.record("authenticate");

        match &self.config.auth_error {
            Some(error) => Err(PlatformError::Authentication(error.clone()).into()),
            None => {
                self.authenticated = true;
                Ok(())
            }
        }
    }

    async fn upload_media(&self, mut media: MediaStream) -> Result<String> {
        self.record("upload");
        self.ensure_authenticated().map_err(PlatformError::Upload)?;

        if let Some(error) = &self.config.upload_error {
            return Err(PlatformError::Upload(error.clone()).into());
        }

        let mut bytes = Vec::new();
        media
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| PlatformError::Upload(e.to_string()))?;

        let mut uploads = self.config.uploads.lock().unwrap();
        uploads.push(bytes);
        Ok(format!("{}-media-{}", self.config.name, uploads.len()))
    }

    async fn create_post(&self, status: &Status) -> Result<String> {
        self.record("post");
        self.ensure_authenticated().map_err(PlatformError::Posting)?;

        if let Some(error) = &self.config.post_error {
            return Err(PlatformError::Posting(error.clone()).into());
        }

        let mut posts = self.config.posts.lock().unwrap();
        posts.push(status.clone());
        Ok(format!("{}-post-{}", self.config.name, posts.len()))
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

/// Mock registrar that returns fixed credentials or a fixed error
#[derive(Debug, Clone, Default)]
pub struct MockRegistrar {
    pub error: Option<String>,
    pub requests: Arc<Mutex<Vec<(String, AppRegistration)>>>,
}

impl MockRegistrar {
    pub fn failing(error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<(String, AppRegistration)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Registrar for MockRegistrar {
    async fn register_application(
        &self,
        server: &str,
        app: &AppRegistration,
    ) -> Result<AppCredentials> {
        self.requests
            .lock()
            .unwrap()
            .push((server.to_string(), app.clone()));

        match &self.error {
            Some(error) => Err(PlatformError::Registration(error.clone()).into()),
            None => Ok(AppCredentials {
                client_id: "mock-client-id".to_string(),
                client_secret: "mock-client-secret".to_string(),
            }),
        }
    }
}
