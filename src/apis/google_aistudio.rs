use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::utilities::api_utils::{DetectServerError, ServerError};

pub enum RequestError {
    Network(reqwest::Error),
    Server(StatusCode),
    Google(Error),
    Url(url::ParseError),
}

impl From<reqwest::Error> for RequestError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value)
    }
}

impl From<ServerError> for RequestError {
    fn from(value: ServerError) -> Self {
        Self::Server(value.0)
    }
}

impl From<url::ParseError> for RequestError {
    fn from(value: url::ParseError) -> Self {
        Self::Url(value)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content<'a>],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
pub struct Content<'a> {
    pub parts: Vec<Part<'a>>,
    pub role: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part<'a> {
    Text(&'a str),
    InlineData(Blob),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: &'static str,
    pub data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    candidate_count: u8,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<ContentResponse>,
    pub finish_reason: Option<String>,
}

#[derive(Deserialize)]
pub struct ContentResponse {
    #[serde(default)]
    pub parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
pub struct PartResponse {
    pub text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Deserialize)]
pub struct ErrorResponse {
    pub error: Error,
}

#[derive(Debug, Deserialize)]
pub struct Error {
    pub code: u16,
    pub message: String,
}

impl Error {
    /// Error for a response whose body is not Google's JSON error format.
    fn from_status(status: StatusCode, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            status.canonical_reason().unwrap_or("no error message").to_owned()
        } else {
            body.to_owned()
        };

        Self { code: status.as_u16(), message }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Google error {}: {}", self.code, self.message)
    }
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text = parts.iter().filter_map(|part| part.text.as_deref()).collect::<String>();

        if text.trim().is_empty() { None } else { Some(text) }
    }

    /// Why no text came back, as reported by the service.
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
            .or_else(|| {
                self.candidates
                    .first()
                    .and_then(|candidate| candidate.finish_reason.as_deref())
                    .filter(|reason| *reason != "STOP")
            })
    }
}

pub async fn generate_content(
    http_client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    model: &str,
    contents: &[Content<'_>],
) -> Result<GenerateContentResponse, RequestError> {
    let url = Url::parse_with_params(
        &format!("{base_url}/v1beta/models/{model}:generateContent"),
        [("key", api_key)],
    )?;

    let response = http_client
        .post(url)
        .json(&GenerateContentRequest {
            contents,
            generation_config: GenerationConfig { candidate_count: 1 },
        })
        .send()
        .await?
        .server_error()?;

    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response.json::<GenerateContentResponse>().await?);
    }

    let body = response.text().await?;
    let error = serde_json::from_str::<ErrorResponse>(&body).map_or_else(
        |_| Error::from_status(status, &body),
        |response| response.error,
    );

    Err(RequestError::Google(error))
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_response_text() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"Title: Rain\n\n"},{"text":"It rained."}],
                "role":"model"},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(response.text().as_deref(), Some("Title: Rain\n\nIt rained."));
        assert_eq!(response.block_reason(), None);
    }

    #[test]
    fn test_blocked_response() {
        let response = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        assert_eq!(response.text(), None);
        assert_eq!(response.block_reason(), Some("SAFETY"));

        let response = parse(r#"{"candidates":[{"finishReason":"RECITATION"}]}"#);
        assert_eq!(response.text(), None);
        assert_eq!(response.block_reason(), Some("RECITATION"));

        let response = parse(r#"{"candidates":[{"content":{"parts":[]},"finishReason":"STOP"}]}"#);
        assert_eq!(response.text(), None);
        assert_eq!(response.block_reason(), None);
    }

    #[test]
    fn test_error_from_plain_status() {
        let error =
            Error::from_status(StatusCode::TOO_MANY_REQUESTS, "Resource has been exhausted\n");
        assert_eq!(error.to_string(), "Google error 429: Resource has been exhausted");

        let error = Error::from_status(StatusCode::FORBIDDEN, "");
        assert_eq!(error.to_string(), "Google error 403: Forbidden");
    }

    #[test]
    fn test_request_serialization() {
        let contents = [Content {
            parts: vec![
                Part::Text("prompt"),
                Part::InlineData(Blob { mime_type: "image/png", data: "aGk=".into() }),
            ],
            role: "user",
        }];
        let request = GenerateContentRequest {
            contents: &contents,
            generation_config: GenerationConfig { candidate_count: 1 },
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "contents": [{
                    "parts": [
                        {"text": "prompt"},
                        {"inlineData": {"mimeType": "image/png", "data": "aGk="}}
                    ],
                    "role": "user"
                }],
                "generationConfig": {"candidateCount": 1}
            })
        );
    }
}
