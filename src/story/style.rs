use std::fmt;

/// Narrative genre picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Style {
    Comedy,
    Thriller,
    FairyTale,
    SciFi,
    Mystery,
    Adventure,
    Morale,
    /// A name outside the listed genres. Produces the base prompt only.
    Unlisted(String),
}

/// Tagged section the model is told to append after the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialSection {
    Moral,
    Solution,
    Twist,
}

impl Style {
    pub const LISTED: [Self; 7] = [
        Self::Comedy,
        Self::Thriller,
        Self::FairyTale,
        Self::SciFi,
        Self::Mystery,
        Self::Adventure,
        Self::Morale,
    ];

    pub fn name(&self) -> &str {
        match self {
            Self::Comedy => "Comedy",
            Self::Thriller => "Thriller",
            Self::FairyTale => "Fairy Tale",
            Self::SciFi => "Sci-Fi",
            Self::Mystery => "Mystery",
            Self::Adventure => "Adventure",
            Self::Morale => "Morale",
            Self::Unlisted(name) => name,
        }
    }

    pub const fn special_section(&self) -> Option<SpecialSection> {
        match self {
            Self::Morale => Some(SpecialSection::Moral),
            Self::Mystery => Some(SpecialSection::Solution),
            Self::Thriller => Some(SpecialSection::Twist),
            Self::Comedy | Self::FairyTale | Self::SciFi | Self::Adventure | Self::Unlisted(_) => {
                None
            }
        }
    }
}

impl From<&str> for Style {
    fn from(name: &str) -> Self {
        let name = name.trim();

        Self::LISTED
            .into_iter()
            .find(|style| style.name() == name)
            .unwrap_or_else(|| Self::Unlisted(name.to_owned()))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl SpecialSection {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Moral => "[MORAL]:",
            Self::Solution => "[SOLUTION]:",
            Self::Twist => "[TWIST]:",
        }
    }

    pub const fn instruction(self) -> &'static str {
        match self {
            Self::Moral => "followed by the single-sentence moral of the story.",
            Self::Solution => "that reveals the culprit and the key clue.",
            Self::Twist => "that reveals a final, shocking twist.",
        }
    }
}
