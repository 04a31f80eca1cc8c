use std::fmt::Write;

use super::style::Style;

/// Builds the instruction sent ahead of the images.
pub fn build(style: &Style) -> String {
    let mut prompt = format!(
        "**Your Persona:** You are a friendly and engaging storyteller. Your goal is to tell a \
         story that is fun and easy to read.\n\
         **Your Main Goal:** Write a story in simple, clear, and modern English.\n\
         **Your Task:** Create one single story that connects all the provided images in order.\n\
         **Style Requirement:** The story must fit the '{style}' genre.\n\
         **Core Instructions:**\n\
         1. **Tell One Single Story:** Connect all images into a narrative with a beginning, \
         middle, and end.\n\
         2. **Use Every Image:** Include a key detail from each image.\n\
         3. **Creative Interpretation:** Infer the relationships between the images.\n\
         4. **Nationality:** Use only Indian names, characters, places, personas etc.\n\
         **Output Format:**\n\
         - **Title:** Start with a simple and clear title.\n\
         - **Length:** The story must be between 4 and 5 paragraphs.\n"
    );

    match style.special_section() {
        Some(section) => {
            write!(
                prompt,
                "\n**Special Section:** After the story, you MUST add a section starting with the \
                 exact tag `{}` {}",
                section.tag(),
                section.instruction()
            )
            .unwrap();
        }
        None => {
            if let Style::Unlisted(name) = style {
                log::warn!("unlisted story style {name:?}, using the base prompt");
            }
        }
    }

    prompt
}

#[cfg(test)]
mod test {
    use super::*;

    const TAGS: [&str; 3] = ["[MORAL]:", "[SOLUTION]:", "[TWIST]:"];

    #[test]
    fn test_prompt_is_deterministic() {
        for style in Style::LISTED {
            assert_eq!(build(&style), build(&style));
        }
    }

    #[test]
    fn test_prompt_special_tags() {
        for (style, tag) in [
            (Style::Morale, "[MORAL]:"),
            (Style::Mystery, "[SOLUTION]:"),
            (Style::Thriller, "[TWIST]:"),
        ] {
            let prompt = build(&style);
            assert!(prompt.contains(&format!("`{tag}`")), "{style} prompt is missing {tag}");
            assert_eq!(TAGS.iter().filter(|tag| prompt.contains(*tag)).count(), 1);
            assert!(prompt.contains("**Special Section:**"));
        }
    }

    #[test]
    fn test_prompt_without_special_section() {
        for style in [
            Style::Comedy,
            Style::FairyTale,
            Style::SciFi,
            Style::Adventure,
            Style::Unlisted("Horror".into()),
        ] {
            let prompt = build(&style);
            assert!(TAGS.iter().all(|tag| !prompt.contains(tag)), "{style} prompt has a tag");
            assert!(!prompt.contains("Special Section"));
            assert!(prompt.contains(&format!("'{style}' genre")));
        }
    }

    #[test]
    fn test_base_instructions() {
        let prompt = build(&Style::FairyTale);
        assert!(prompt.contains("connects all the provided images in order"));
        assert!(prompt.contains("Include a key detail from each image"));
        assert!(prompt.contains("Indian names"));
        assert!(prompt.contains("title"));
        assert!(prompt.contains("between 4 and 5 paragraphs"));
        assert!(build(&Style::Mystery).starts_with(&build(&Style::Unlisted("Mystery".into()))));
    }
}
