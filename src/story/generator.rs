use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;

use super::style::Style;
use super::{MAX_IMAGES, Story, prompt};
use crate::apis::google_aistudio::{self, Blob, Content, Part, RequestError};
use crate::utilities::config::Config;
use crate::utilities::image_utils::StoryImage;
use crate::utilities::text_utils::TruncateWithEllipsis;

#[derive(Debug)]
pub enum GenerationError {
    InvalidImageCount,
    MissingApiKey,
    NoContent { reason: Option<String> },
    Google(google_aistudio::Error),
    Server(StatusCode),
    Network(reqwest::Error),
    Url(url::ParseError),
    Timeout(Duration),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNEXPECTED: &str = "An unexpected error occurred during the API call";

        match self {
            Self::InvalidImageCount => write!(
                f,
                "Validation Error: Please provide between 1 and {MAX_IMAGES} images."
            ),
            Self::MissingApiKey => f.write_str("API Key not configured."),
            Self::NoContent { reason } => {
                f.write_str(
                    "API Error: The model returned no content. This might be due to safety \
                     filters.",
                )?;
                if let Some(reason) = reason {
                    write!(f, " (reason: {reason})")?;
                }
                Ok(())
            }
            Self::Google(err) => write!(f, "{UNEXPECTED}: {err}"),
            Self::Server(status) => write!(f, "{UNEXPECTED}: server error {status}"),
            Self::Network(err) => write!(f, "{UNEXPECTED}: {err}"),
            Self::Url(err) => write!(f, "{UNEXPECTED}: invalid URL: {err}"),
            Self::Timeout(timeout) => {
                write!(f, "{UNEXPECTED}: no response within {}s", timeout.as_secs_f32())
            }
        }
    }
}

impl From<RequestError> for GenerationError {
    fn from(value: RequestError) -> Self {
        match value {
            RequestError::Network(err) => Self::Network(err),
            RequestError::Server(status) => Self::Server(status),
            RequestError::Google(err) => Self::Google(err),
            RequestError::Url(err) => Self::Url(err),
        }
    }
}

#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Writes one story connecting `images` in order.
    async fn generate(
        &self,
        images: &[StoryImage],
        style: &Style,
    ) -> Result<Story, GenerationError>;
}

pub struct GeminiStoryGenerator {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GeminiStoryGenerator {
    pub fn new(http_client: reqwest::Client, config: &Config) -> Self {
        Self {
            http_client,
            base_url: config.gemini_base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: config.generation_timeout,
        }
    }
}

#[async_trait]
impl StoryGenerator for GeminiStoryGenerator {
    async fn generate(
        &self,
        images: &[StoryImage],
        style: &Style,
    ) -> Result<Story, GenerationError> {
        if !(1..=MAX_IMAGES).contains(&images.len()) {
            log::error!("rejecting {} image(s)", images.len());
            return Err(GenerationError::InvalidImageCount);
        }

        if self.api_key.trim().is_empty() {
            log::error!("{}", GenerationError::MissingApiKey);
            return Err(GenerationError::MissingApiKey);
        }

        let prompt = prompt::build(style);
        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(Part::Text(&prompt));
        parts.extend(images.iter().map(|image| {
            Part::InlineData(Blob {
                mime_type: image.mime_type(),
                data: STANDARD.encode(&image.bytes),
            })
        }));
        let contents = [Content { parts, role: "user" }];

        log::info!("generating a {style} story from {} image(s) with {}", images.len(), self.model);

        let response = tokio::time::timeout(
            self.timeout,
            google_aistudio::generate_content(
                &self.http_client,
                &self.base_url,
                &self.api_key,
                &self.model,
                &contents,
            ),
        )
        .await
        .map_err(|_| GenerationError::Timeout(self.timeout))??;

        let Some(text) = response.text() else {
            let reason = response.block_reason().map(str::to_owned);
            log::warn!(
                "model returned no content (reason: {})",
                reason.as_deref().unwrap_or("none")
            );
            return Err(GenerationError::NoContent { reason });
        };

        log::debug!("generated story: {}", text.clone().truncate_with_ellipsis(80));

        Ok(Story::new(text))
    }
}
