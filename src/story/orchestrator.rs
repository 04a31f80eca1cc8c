use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use futures_util::FutureExt;
use serde::{Serialize, Serializer};

use super::generator::StoryGenerator;
use super::narrator::{Narration, Narrator};
use super::style::Style;
use super::{MAX_IMAGES, Story};
use crate::utilities::image_utils::{ImageError, StoryImage};

pub const NO_IMAGES: &str = "Please upload at least one image.";
pub const TOO_MANY_IMAGES: &str = "Please upload a maximum of 10 images.";
pub const NARRATION_FAILED: &str = "Sorry, the audio narration could not be generated.";

/// File received from the browser, not yet decoded.
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// One rendered element of the result page, in display order.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Warning {
        text: String,
    },
    Error {
        text: String,
    },
    Images {
        heading: &'static str,
        images: Vec<ImageBlock>,
    },
    Story {
        heading: String,
        text: String,
        title: Option<String>,
        special_section: Option<SectionBlock>,
    },
    Audio {
        heading: &'static str,
        mime_type: &'static str,
        #[serde(serialize_with = "as_base64")]
        data: Bytes,
    },
    NarrationError {
        text: String,
    },
}

#[derive(Debug, Serialize)]
pub struct ImageBlock {
    pub caption: String,
    pub mime_type: &'static str,
    #[serde(serialize_with = "as_base64")]
    pub data: Bytes,
}

#[derive(Debug, Serialize)]
pub struct SectionBlock {
    pub tag: &'static str,
    pub text: String,
}

#[derive(Debug, Default, Serialize)]
pub struct Page {
    pub blocks: Vec<Block>,
}

impl Page {
    fn warning(&mut self, text: &str) {
        self.blocks.push(Block::Warning { text: text.into() });
    }

    fn error(&mut self, text: String) {
        self.blocks.push(Block::Error { text });
    }

    fn images(&mut self, images: &[StoryImage]) {
        let images = images
            .iter()
            .enumerate()
            .map(|(i, image)| ImageBlock {
                caption: format!("Image {}", i + 1),
                mime_type: image.mime_type(),
                data: image.bytes.clone(),
            })
            .collect();

        self.blocks.push(Block::Images { heading: "Your Visual Inspiration:", images });
    }

    fn story(&mut self, style: &Style, story: &Story) {
        let special_section = style.special_section().and_then(|section| {
            story
                .special_section(section)
                .map(|text| SectionBlock { tag: section.tag(), text: text.into() })
        });

        self.blocks.push(Block::Story {
            heading: format!("Your {style} Story:"),
            text: story.text.clone(),
            title: story.title().map(str::to_owned),
            special_section,
        });
    }

    fn audio(&mut self, narration: &Narration) {
        self.blocks.push(Block::Audio {
            heading: "Listen to the Story:",
            mime_type: Narration::MIME_TYPE,
            data: narration.bytes().clone(),
        });
    }

    fn narration_error(&mut self) {
        self.blocks.push(Block::NarrationError { text: NARRATION_FAILED.into() });
    }
}

fn as_base64<S: Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(data))
}

#[derive(Debug)]
pub enum ApplicationError {
    Image { file_name: String, source: ImageError },
    Panic(String),
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image { file_name, source } => write!(f, "{file_name:?}: {source}"),
            Self::Panic(message) => f.write_str(message),
        }
    }
}

/// Runs one upload through generation and narration.
pub struct Orchestrator {
    generator: Arc<dyn StoryGenerator>,
    narrator: Arc<dyn Narrator>,
}

impl Orchestrator {
    pub fn new(generator: Arc<dyn StoryGenerator>, narrator: Arc<dyn Narrator>) -> Self {
        Self { generator, narrator }
    }

    pub async fn handle(&self, uploads: Vec<Upload>, style: Style) -> Page {
        let mut page = Page::default();

        if uploads.is_empty() {
            page.warning(NO_IMAGES);
            return page;
        }

        if uploads.len() > MAX_IMAGES {
            log::debug!("rejecting {} uploads", uploads.len());
            page.warning(TOO_MANY_IMAGES);
            return page;
        }

        let result = AssertUnwindSafe(self.run(&mut page, uploads, &style))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ApplicationError::Panic(panic_message(&*panic))));

        if let Err(err) = result {
            log::error!("request failed: {err}");
            page.error(format!("An application error occurred: {err}"));
        }

        page
    }

    async fn run(
        &self,
        page: &mut Page,
        uploads: Vec<Upload>,
        style: &Style,
    ) -> Result<(), ApplicationError> {
        let images = uploads
            .into_iter()
            .map(|upload| {
                StoryImage::decode(upload.bytes).map_err(|source| ApplicationError::Image {
                    file_name: upload.file_name,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (i, image) in images.iter().enumerate() {
            log::debug!("image {}: {}x{} {}", i + 1, image.width, image.height, image.mime_type());
        }

        page.images(&images);

        let story = match self.generator.generate(&images, style).await {
            Ok(story) => story,
            Err(err) => {
                log::error!("story generation failed: {err}");
                page.error(err.to_string());
                return Ok(());
            }
        };

        page.story(style, &story);

        match self.narrator.narrate(&story.text).await {
            Ok(narration) => page.audio(&narration),
            Err(err) => {
                log::error!("narration failed: {err}");
                page.narration_error();
            }
        }

        Ok(())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".into())
}
