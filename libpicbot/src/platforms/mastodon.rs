//! Mastodon platform implementation
//!
//! Uses the megalodon library for the Mastodon API. Logging in uses the
//! OAuth2 password grant, which megalodon does not provide, so the token
//! request goes through reqwest directly and the resulting token is handed
//! to a megalodon client.

use std::time::Duration;

use async_trait::async_trait;
use megalodon::entities::UploadMedia;
use megalodon::error::{Error as MegalodonError, Kind};
use megalodon::megalodon::{AppInputOptions, PostStatusInputOptions, PostStatusOutput};
use megalodon::{Megalodon, SNS};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::{normalize_server_url, AppConfig, LoginConfig};
use crate::error::{PlatformError, Result};
use crate::platforms::{AppCredentials, AppRegistration, Publisher, Registrar};
use crate::registration::SCOPES;
use crate::resolver::{http_client, user_agent};
use crate::types::{MediaStream, Status};

/// Number of times media still being processed is checked before giving up
const MEDIA_CHECK_ATTEMPTS: u32 = 10;

const MEDIA_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Publishes to a Mastodon-compatible server.
pub struct MastodonPublisher {
    app: AppConfig,
    http: Client,
    /// Set once authentication has succeeded
    client: Option<Box<dyn Megalodon + Send + Sync>>,
    media_check_interval: Duration,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl MastodonPublisher {
    /// Create an unauthenticated publisher for the configured server.
    pub fn new(app: AppConfig) -> Result<Self> {
        Ok(Self::with_http_client(app, http_client()?))
    }

    pub fn with_http_client(app: AppConfig, http: Client) -> Self {
        Self {
            app,
            http,
            client: None,
            media_check_interval: MEDIA_CHECK_INTERVAL,
        }
    }

    /// Set the delay between checks on media the server is still processing.
    pub fn with_media_check_interval(mut self, interval: Duration) -> Self {
        self.media_check_interval = interval;
        self
    }

    fn token_url(&self) -> String {
        format!("{}/oauth/token", self.app.server)
    }

    fn client(&self) -> std::result::Result<&(dyn Megalodon + Send + Sync), String> {
        self.client
            .as_deref()
            .ok_or_else(|| "Not authenticated".to_string())
    }

    /// Exchange account credentials for an access token.
    async fn request_token(&self, login: &LoginConfig) -> Result<String> {
        let scope = SCOPES.join(" ");
        let params = [
            ("grant_type", "password"),
            ("client_id", self.app.client_id.as_str()),
            ("client_secret", self.app.client_secret.expose_secret()),
            ("username", login.username.as_str()),
            ("password", login.password.expose_secret()),
            ("scope", scope.as_str()),
        ];

        let response = self
            .http
            .post(self.token_url())
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                PlatformError::Authentication(format!(
                    "Mastodon token request failed: {}. \
                     Suggestion: Check that Server in the config file is reachable.",
                    e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Authentication(format!(
                "Mastodon rejected the login (HTTP {}): {}. \
                 Suggestion: Verify Username, Password, ClientID and ClientSecret.",
                status,
                body.trim()
            ))
            .into());
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            PlatformError::Authentication(format!("Mastodon token response was not understood: {}", e))
        })?;
        Ok(token.access_token)
    }

    /// Wait until the server has finished processing an uploaded attachment.
    ///
    /// Mastodon answers 206 for media that is not ready yet; a status that
    /// references it is rejected.
    async fn wait_for_media(
        &self,
        client: &(dyn Megalodon + Send + Sync),
        media_id: &str,
    ) -> Result<()> {
        for attempt in 1..=MEDIA_CHECK_ATTEMPTS {
            tokio::time::sleep(self.media_check_interval).await;

            match client.get_media(media_id.to_string()).await {
                Ok(_) => {
                    debug!("Media {} finished processing", media_id);
                    return Ok(());
                }
                Err(MegalodonError::OwnError(ref own))
                    if matches!(own.kind, Kind::HTTPPartialContentError) =>
                {
                    debug!(
                        "Media {} still processing (check {} of {})",
                        media_id, attempt, MEDIA_CHECK_ATTEMPTS
                    );
                }
                Err(e) => {
                    return Err(
                        PlatformError::Upload(describe_megalodon_error(&e, "check media")).into(),
                    )
                }
            }
        }

        Err(PlatformError::Upload(format!(
            "Media {} was still processing after {} checks",
            media_id, MEDIA_CHECK_ATTEMPTS
        ))
        .into())
    }
}

#[async_trait]
impl Publisher for MastodonPublisher {
    async fn authenticate(&mut self, login: &LoginConfig) -> Result<()> {
        let token = self.request_token(login).await?;

        let client = megalodon::generator(
            SNS::Mastodon,
            self.app.server.clone(),
            Some(token),
            Some(user_agent()),
        )
        .map_err(|e| {
            PlatformError::Authentication(format!("Failed to create Mastodon client: {:?}", e))
        })?;

        let account = client.verify_account_credentials().await.map_err(|e| {
            PlatformError::Authentication(describe_megalodon_error(&e, "verify credentials"))
        })?;
        info!("Logged in to {} as {}", self.app.server, account.json.acct);

        self.client = Some(client);
        Ok(())
    }

    async fn upload_media(&self, media: MediaStream) -> Result<String> {
        let client = self.client().map_err(PlatformError::Upload)?;

        let response = client
            .upload_media_reader(media, None)
            .await
            .map_err(|e| PlatformError::Upload(describe_megalodon_error(&e, "upload media")))?;

        let media_id = match response.json {
            UploadMedia::Attachment(attachment) => attachment.id,
            UploadMedia::AsyncAttachment(attachment) => {
                debug!("Media {} accepted for processing", attachment.id);
                self.wait_for_media(client, &attachment.id).await?;
                attachment.id
            }
        };
        debug!("Uploaded media {}", media_id);
        Ok(media_id)
    }

    async fn create_post(&self, status: &Status) -> Result<String> {
        let client = self.client().map_err(PlatformError::Posting)?;

        let options = PostStatusInputOptions {
            media_ids: Some(status.media_ids.clone()),
            sensitive: Some(status.sensitive),
            ..Default::default()
        };

        let response = client
            .post_status(status.text.clone(), Some(&options))
            .await
            .map_err(|e| PlatformError::Posting(describe_megalodon_error(&e, "post status")))?;

        let post_id = match response.json {
            PostStatusOutput::Status(status) => status.id,
            PostStatusOutput::ScheduledStatus(scheduled) => scheduled.id,
        };
        Ok(post_id)
    }

    fn name(&self) -> &str {
        "mastodon"
    }
}

/// Registers applications on Mastodon-compatible servers.
#[derive(Debug, Default)]
pub struct MastodonRegistrar;

#[async_trait]
impl Registrar for MastodonRegistrar {
    async fn register_application(
        &self,
        server: &str,
        app: &AppRegistration,
    ) -> Result<AppCredentials> {
        let client = megalodon::generator(
            SNS::Mastodon,
            normalize_server_url(server),
            None,
            Some(user_agent()),
        )
        .map_err(|e| {
            PlatformError::Registration(format!("Failed to create Mastodon client: {:?}", e))
        })?;

        let options = AppInputOptions {
            scopes: Some(app.scopes.clone()),
            redirect_uris: None,
            website: Some(app.website.clone()),
        };

        let data = client
            .register_app(app.name.clone(), &options)
            .await
            .map_err(|e| PlatformError::Registration(describe_megalodon_error(&e, "register app")))?;

        Ok(AppCredentials {
            client_id: data.client_id,
            client_secret: data.client_secret,
        })
    }
}

/// Render a megalodon error with the failed operation and, when an HTTP
/// status can be found in it, a hint for the operator.
fn describe_megalodon_error(error: &MegalodonError, context: &str) -> String {
    let error_str = error.to_string();
    match http_status(error).and_then(status_hint) {
        Some(hint) => format!("Mastodon {} failed: {}. Suggestion: {}", context, error_str, hint),
        None => format!("Mastodon {} failed: {}", context, error_str),
    }
}

fn status_hint(status: u16) -> Option<&'static str> {
    match status {
        401 | 403 => Some("Verify the credentials in the config file and that the app still exists."),
        413 => Some("The image is larger than the server accepts."),
        422 => Some("The server rejected the content; check the image format and size."),
        429 => Some("The server is rate limiting this account; run less often."),
        500..=599 => Some("The instance may be experiencing issues; try again later."),
        _ => None,
    }
}

/// The HTTP status a megalodon error carries, if any
fn http_status(error: &MegalodonError) -> Option<u16> {
    match error {
        MegalodonError::OwnError(own) => own
            .status
            .or_else(|| extract_http_status(&own.message)),
        MegalodonError::RequestError(e) => e.status().map(|status| status.as_u16()),
        other => extract_http_status(&other.to_string()),
    }
}

/// Extract an HTTP status code from an error message
///
/// Looks for patterns like "HTTP 401", "status 403" or a bare "401:".
fn extract_http_status(error_str: &str) -> Option<u16> {
    let prefixes = ["HTTP ", "status ", "code: ", "status_code: "];

    for prefix in &prefixes {
        if let Some(pos) = error_str.find(prefix) {
            let after_prefix = &error_str[pos + prefix.len()..];
            if let Some(code) = after_prefix.get(0..3).and_then(|s| s.parse::<u16>().ok()) {
                if (100..=599).contains(&code) {
                    return Some(code);
                }
            }
        }
    }

    // Three digits followed by ':' or ' ', not part of a longer number
    let bytes = error_str.as_bytes();
    for (i, window) in bytes.windows(4).enumerate() {
        let digits = &window[0..3];
        if digits.iter().all(u8::is_ascii_digit)
            && (window[3] == b':' || window[3] == b' ')
            && (i == 0 || !bytes[i - 1].is_ascii_digit())
        {
            if let Some(code) = std::str::from_utf8(digits).ok().and_then(|s| s.parse::<u16>().ok()) {
                if (100..=599).contains(&code) {
                    return Some(code);
                }
            }
        }
    }

    None
}
