use bytes::Bytes;
use reqwest::Url;

use crate::utilities::api_utils::DetectServerError;

pub enum SynthesisError {
    Network(reqwest::Error),
    Server(reqwest::StatusCode),
    Url(url::ParseError),
}

impl From<reqwest::Error> for SynthesisError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value)
    }
}

impl From<url::ParseError> for SynthesisError {
    fn from(value: url::ParseError) -> Self {
        Self::Url(value)
    }
}

/// Synthesizes one short piece of text at normal speed. Returns MP3 data.
pub async fn synthesize(
    http_client: &reqwest::Client,
    base_url: &str,
    text: &str,
    language: &str,
    (index, total): (usize, usize),
) -> Result<Bytes, SynthesisError> {
    let url = Url::parse_with_params(
        &format!("{base_url}/translate_tts"),
        [
            ("ie", "UTF-8"),
            ("q", text),
            ("tl", language),
            ("ttsspeed", "1"),
            ("total", &total.to_string()),
            ("idx", &index.to_string()),
            ("textlen", &text.chars().count().to_string()),
            ("client", "tw-ob"),
        ],
    )?;

    let response = http_client
        .get(url)
        .send()
        .await?
        .server_error()
        .map_err(|err| SynthesisError::Server(err.0))?
        .error_for_status()?;

    Ok(response.bytes().await?)
}
