pub mod generator;
pub mod narrator;
pub mod orchestrator;
pub mod prompt;
pub mod style;

use style::SpecialSection;

/// Upload count accepted by the generator and the orchestrator.
pub const MAX_IMAGES: usize = 10;

/// Text returned by the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub text: String,
}

impl Story {
    pub const fn new(text: String) -> Self {
        Self { text }
    }

    /// First non-empty line with `Title:` and markdown decoration removed.
    pub fn title(&self) -> Option<&str> {
        let line = self.text.lines().map(str::trim).find(|line| !line.is_empty())?;
        let line = line.trim_start_matches('#').trim();
        let line = line.trim_matches('*').trim();
        let line = line
            .strip_prefix("Title:")
            .or_else(|| line.strip_prefix("title:"))
            .map_or(line, str::trim);
        let line = line.trim_matches('*').trim();

        if line.is_empty() { None } else { Some(line) }
    }

    /// Text following the tag of `section`, up to the end of the story.
    pub fn special_section(&self, section: SpecialSection) -> Option<&str> {
        let tag = section.tag();
        let start = self.text.find(tag)? + tag.len();
        let body = self.text[start..].trim().trim_matches('`').trim();

        if body.is_empty() { None } else { Some(body) }
    }
}
