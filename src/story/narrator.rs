use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::{StreamExt, TryStreamExt, stream};
use reqwest::StatusCode;

use crate::apis::google_tts::{self, SynthesisError};
use crate::utilities::config::Config;
use crate::utilities::text_utils;

/// Longest piece of text sent in one speech request.
const CHUNK_LEN: usize = 100;
const CONCURRENT_REQUESTS: usize = 4;

/// Encoded narration of a whole story.
#[derive(Debug, Clone)]
pub struct Narration {
    mp3: Bytes,
}

impl Narration {
    pub const MIME_TYPE: &'static str = "audio/mp3";

    pub const fn new(mp3: Bytes) -> Self {
        Self { mp3 }
    }

    /// The whole stream, starting at its first byte.
    pub const fn bytes(&self) -> &Bytes {
        &self.mp3
    }
}

#[derive(Debug)]
pub enum NarrationError {
    EmptyText,
    EmptyAudio,
    Server(StatusCode),
    Network(reqwest::Error),
    Url(url::ParseError),
    Timeout(Duration),
}

impl fmt::Display for NarrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyText => f.write_str("there is no text to narrate"),
            Self::EmptyAudio => f.write_str("the speech service returned no audio"),
            Self::Server(status) => write!(f, "speech service error {status}"),
            Self::Network(err) => write!(f, "speech request failed: {err}"),
            Self::Url(err) => write!(f, "invalid speech service URL: {err}"),
            Self::Timeout(timeout) => {
                write!(f, "narration took longer than {}s", timeout.as_secs_f32())
            }
        }
    }
}

impl From<SynthesisError> for NarrationError {
    fn from(value: SynthesisError) -> Self {
        match value {
            SynthesisError::Network(err) => Self::Network(err),
            SynthesisError::Server(status) => Self::Server(status),
            SynthesisError::Url(err) => Self::Url(err),
        }
    }
}

#[async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(&self, text: &str) -> Result<Narration, NarrationError>;
}

pub struct GoogleNarrator {
    http_client: reqwest::Client,
    base_url: String,
    language: String,
    timeout: Duration,
}

impl GoogleNarrator {
    pub fn new(http_client: reqwest::Client, config: &Config) -> Self {
        Self {
            http_client,
            base_url: config.tts_base_url.clone(),
            language: config.tts_language.clone(),
            timeout: config.narration_timeout,
        }
    }

    async fn synthesize_chunks(&self, chunks: &[String]) -> Result<Bytes, NarrationError> {
        let total = chunks.len();

        let requests = chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| {
                google_tts::synthesize(
                    &self.http_client,
                    &self.base_url,
                    chunk,
                    &self.language,
                    (index, total),
                )
            })
            .collect::<Vec<_>>();

        let parts = stream::iter(requests)
            .buffered(CONCURRENT_REQUESTS)
            .try_collect::<Vec<_>>()
            .await?;

        let mut mp3 = BytesMut::with_capacity(parts.iter().map(Bytes::len).sum());
        for part in parts {
            mp3.extend_from_slice(&part);
        }

        Ok(mp3.freeze())
    }
}

#[async_trait]
impl Narrator for GoogleNarrator {
    async fn narrate(&self, text: &str) -> Result<Narration, NarrationError> {
        let chunks = text_utils::split_for_speech(text, CHUNK_LEN);

        if chunks.is_empty() {
            return Err(NarrationError::EmptyText);
        }

        log::info!("narrating {} characters in {} request(s)", text.len(), chunks.len());

        let mp3 = tokio::time::timeout(self.timeout, self.synthesize_chunks(&chunks))
            .await
            .map_err(|_| NarrationError::Timeout(self.timeout))??;

        if mp3.is_empty() {
            return Err(NarrationError::EmptyAudio);
        }

        log::debug!("narration ready, {} bytes", mp3.len());

        Ok(Narration::new(mp3))
    }
}
