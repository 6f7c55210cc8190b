//! Publishing a picked image
//!
//! One attempt, no retries: authenticate, upload the image, create the
//! status. The first failure ends the run. A status that fails after its
//! upload succeeded leaves the uploaded media orphaned on the server.

use tracing::{info, warn};

use crate::config::LoginConfig;
use crate::error::Result;
use crate::platforms::Publisher;
use crate::types::{ResolvedResource, Status};

/// Identifiers of a published image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub platform: String,
    pub media_id: String,
    pub post_id: String,
}

/// Publish `image` with a `Source: <attribution>` caption.
///
/// The image stream is consumed by the upload and closed on every path.
pub async fn publish(
    publisher: &mut dyn Publisher,
    login: &LoginConfig,
    image: ResolvedResource,
) -> Result<PublishedPost> {
    let platform = publisher.name().to_string();
    publisher.authenticate(login).await?;

    let caption = image.caption();
    let ResolvedResource {
        location,
        stream,
        sensitive,
        ..
    } = image;

    let media_id = publisher.upload_media(stream).await?;
    info!("Uploaded {} to {} as media {}", location, platform, media_id);

    let status = Status {
        text: caption,
        media_ids: vec![media_id.clone()],
        sensitive,
    };
    let post_id = match publisher.create_post(&status).await {
        Ok(post_id) => post_id,
        Err(e) => {
            warn!("Media {} was uploaded but the post failed; it will not be used", media_id);
            return Err(e);
        }
    };
    info!("Posted {} to {}", post_id, platform);

    Ok(PublishedPost {
        platform,
        media_id,
        post_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PicbotError, PlatformError};
    use crate::platforms::mock::MockPublisher;
    use secrecy::SecretString;

    fn login() -> LoginConfig {
        LoginConfig {
            username: "bot".to_string(),
            password: SecretString::from("hunter2".to_string()),
        }
    }

    fn image(attribution: &str, sensitive: bool) -> ResolvedResource {
        ResolvedResource {
            location: "images/a.png".to_string(),
            stream: Box::new(std::io::Cursor::new(b"png bytes".to_vec())),
            attribution: attribution.to_string(),
            sensitive,
        }
    }

    #[tokio::test]
    async fn test_publish_builds_caption_and_forwards_flag() {
        let mut publisher = MockPublisher::success();
        let published = publish(&mut publisher, &login(), image("some artist", true))
            .await
            .unwrap();

        assert_eq!(
            published,
            PublishedPost {
                platform: "mock".to_string(),
                media_id: "mock-media-1".to_string(),
                post_id: "mock-post-1".to_string(),
            }
        );
        assert_eq!(publisher.uploads(), vec![b"png bytes".to_vec()]);
        assert_eq!(
            publisher.posts(),
            vec![Status {
                text: "Source: some artist".to_string(),
                media_ids: vec!["mock-media-1".to_string()],
                sensitive: true,
            }]
        );
    }

    #[tokio::test]
    async fn test_publish_not_sensitive() {
        let mut publisher = MockPublisher::success();
        publish(&mut publisher, &login(), image("artist", false))
            .await
            .unwrap();
        assert!(!publisher.posts()[0].sensitive);
    }

    #[tokio::test]
    async fn test_auth_failure_stops_before_upload() {
        let mut publisher = MockPublisher::auth_failure("invalid_grant");
        let error = publish(&mut publisher, &login(), image("artist", false))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            PicbotError::Platform(PlatformError::Authentication(_))
        ));
        assert_eq!(publisher.calls(), vec!["authenticate"]);
    }

    #[tokio::test]
    async fn test_upload_failure_stops_before_post() {
        let mut publisher = MockPublisher::upload_failure("413 Payload Too Large");
        let error = publish(&mut publisher, &login(), image("artist", false))
            .await
            .unwrap_err();

        assert!(error.to_string().contains("Media upload failed"));
        assert_eq!(publisher.calls(), vec!["authenticate", "upload"]);
        assert!(publisher.posts().is_empty());
    }

    #[tokio::test]
    async fn test_post_failure_is_not_retried() {
        let mut publisher = MockPublisher::post_failure("422 Unprocessable Entity");
        let error = publish(&mut publisher, &login(), image("artist", false))
            .await
            .unwrap_err();

        assert!(error.to_string().contains("Posting failed: 422"));
        assert_eq!(publisher.calls(), vec!["authenticate", "upload", "post"]);
        assert_eq!(publisher.uploads().len(), 1);
    }
}
