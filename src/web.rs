use std::fmt::Write;
use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::story::orchestrator::{Orchestrator, Page, Upload};
use crate::story::style::Style;

const INDEX: &str = include_str!("web/index.html");

pub enum WebError {
    BadRequest(String),
}

impl From<MultipartError> for WebError {
    fn from(value: MultipartError) -> Self {
        Self::BadRequest(format!("cannot read upload: {}", value.body_text()))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => {
                log::warn!("bad request: {message}");
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}

pub fn router(orchestrator: Arc<Orchestrator>, max_upload_size: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/story", post(story))
        .layer(DefaultBodyLimit::max(max_upload_size))
        .with_state(orchestrator)
}

async fn index() -> Html<String> {
    let mut options = String::new();
    for style in Style::LISTED {
        write!(options, r#"<option value="{style}">{style}</option>"#).unwrap();
    }

    Html(INDEX.replace("{{styles}}", &options))
}

async fn story(
    State(orchestrator): State<Arc<Orchestrator>>,
    mut multipart: Multipart,
) -> Result<Json<Page>, WebError> {
    let mut uploads = Vec::new();
    let mut style = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();

        match name.as_str() {
            "images" => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await?;

                // an empty file input still submits one nameless, empty part
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }

                uploads.push(Upload { file_name, bytes });
            }
            "style" => style = Some(Style::from(field.text().await?.as_str())),
            _ => {}
        }
    }

    let style = style.ok_or_else(|| WebError::BadRequest("missing style field".into()))?;

    log::info!("story requested: {} upload(s), style {style}", uploads.len());

    Ok(Json(orchestrator.handle(uploads, style).await))
}
