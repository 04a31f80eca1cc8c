use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use tokio::net::TcpListener;

use super::config::Config;
use super::image_utils::StoryImage;
use crate::story::Story;
use crate::story::generator::{GenerationError, StoryGenerator};
use crate::story::narrator::{Narration, NarrationError, Narrator};
use crate::story::style::Style;

pub fn image(format: ImageFormat, width: u32, height: u32) -> Bytes {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(width, height).write_to(&mut buffer, format).unwrap();
    buffer.into_inner().into()
}

pub fn story_image(width: u32, height: u32) -> StoryImage {
    StoryImage::decode(image(ImageFormat::Png, width, height)).unwrap()
}

pub fn config(gemini_base_url: &str, tts_base_url: &str) -> Config {
    let mut config =
        Config::from_lookup(|name| (name == "GOOGLE_API_KEY").then(|| "test-key".to_owned()))
            .unwrap();
    config.model = "test-model".into();
    config.gemini_base_url = gemini_base_url.into();
    config.tts_base_url = tts_base_url.into();
    config
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{address}")
}

type GenerateFn = dyn Fn(&[StoryImage], &Style) -> Result<Story, GenerationError> + Send + Sync;

pub struct FakeGenerator {
    respond: Box<GenerateFn>,
    pub calls: AtomicUsize,
    pub styles: Mutex<Vec<Style>>,
}

impl FakeGenerator {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&[StoryImage], &Style) -> Result<Story, GenerationError> + Send + Sync + 'static,
    {
        Self { respond: Box::new(respond), calls: AtomicUsize::new(0), styles: Mutex::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoryGenerator for FakeGenerator {
    async fn generate(
        &self,
        images: &[StoryImage],
        style: &Style,
    ) -> Result<Story, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.styles.lock().unwrap().push(style.clone());
        (self.respond)(images, style)
    }
}

type NarrateFn = dyn Fn(&str) -> Result<Narration, NarrationError> + Send + Sync;

pub struct FakeNarrator {
    respond: Box<NarrateFn>,
    pub calls: AtomicUsize,
    pub texts: Mutex<Vec<String>>,
}

impl FakeNarrator {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&str) -> Result<Narration, NarrationError> + Send + Sync + 'static,
    {
        Self { respond: Box::new(respond), calls: AtomicUsize::new(0), texts: Mutex::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Narrator for FakeNarrator {
    async fn narrate(&self, text: &str) -> Result<Narration, NarrationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().unwrap().push(text.to_owned());
        (self.respond)(text)
    }
}
