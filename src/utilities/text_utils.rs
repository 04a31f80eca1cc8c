const CLAUSE_ENDINGS: [char; 8] = ['.', '!', '?', ';', ':', ',', '…', '—'];

pub trait TruncateWithEllipsis {
    fn truncate_with_ellipsis(self, max_len: usize) -> Self;
}

impl TruncateWithEllipsis for String {
    fn truncate_with_ellipsis(mut self, max_len: usize) -> Self {
        if max_len == 0 {
            self.clear();
        } else if self.chars().count() > max_len {
            let end = self.char_indices().nth(max_len - 1).map_or(self.len(), |(i, _)| i);
            self.truncate(end);
            self.push('…');
        }

        self
    }
}

/// Splits `text` into pieces of at most `max_len` characters, preferring clause
/// boundaries, then whitespace. Runs of whitespace are collapsed.
pub fn split_for_speech(text: &str, max_len: usize) -> Vec<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut rest = normalized.as_str();
    let mut chunks = Vec::new();

    while rest.chars().count() > max_len {
        let limit = rest.char_indices().nth(max_len).map_or(rest.len(), |(i, _)| i);
        let window = &rest[..limit];

        let end = clause_end(rest, limit)
            .or_else(|| rest[limit..].starts_with(' ').then_some(limit))
            .or_else(|| window.rfind(' '))
            .filter(|&end| end > 0)
            .unwrap_or(limit);

        let chunk = rest[..end].trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_owned());
        }
        rest = rest[end..].trim_start();
    }

    let chunk = rest.trim();
    if !chunk.is_empty() {
        chunks.push(chunk.to_owned());
    }

    chunks
}

/// End of the last clause in `rest[..limit]`. Punctuation only ends a clause
/// when a space or the end of the text follows it, so "1,000" and "3.5" stay whole.
fn clause_end(rest: &str, limit: usize) -> Option<usize> {
    rest[..limit]
        .char_indices()
        .rev()
        .filter(|(_, c)| CLAUSE_ENDINGS.contains(c))
        .map(|(i, c)| i + c.len_utf8())
        .find(|&end| matches!(rest[end..].chars().next(), None | Some(' ')))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(String::from("short").truncate_with_ellipsis(10), "short");
        assert_eq!(String::from("exactly10!").truncate_with_ellipsis(10), "exactly10!");
        assert_eq!(String::from("a little too long").truncate_with_ellipsis(8), "a littl…");
        assert_eq!(String::from("नमस्ते दुनिया").truncate_with_ellipsis(4), "नमस…");
        assert_eq!(String::from("anything").truncate_with_ellipsis(0), "");
    }

    #[test]
    fn test_split_short_text() {
        assert_eq!(split_for_speech("  Hello,\n\n world.  ", 100), ["Hello, world."]);
        assert!(split_for_speech(" \n\t ", 100).is_empty());
    }

    #[test]
    fn test_split_on_clauses() {
        let text = "Ravi ran home. Meera laughed, and the dog barked loudly.";
        let chunks = split_for_speech(text, 20);
        assert_eq!(chunks, ["Ravi ran home.", "Meera laughed,", "and the dog barked", "loudly."]);
        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= 20));
    }

    #[test]
    fn test_split_long_word() {
        let chunks = split_for_speech("abcdefghij klm", 4);
        assert_eq!(chunks, ["abcd", "efgh", "ij", "klm"]);
    }

    #[test]
    fn test_split_preserves_words() {
        let text = "Once upon a time in a small village near Jaipur there lived a curious girl \
                    named Anaya who loved kites more than anything else in the whole wide world";
        let chunks = split_for_speech(text, 30);
        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= 30));
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_split_keeps_numbers_whole() {
        let text = format!(
            "{}The fort cost 1,000 rupees and the well was 3.5 metres deep.",
            "word ".repeat(14)
        );
        let chunks = split_for_speech(&text, 100);

        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= 100));
        assert!(chunks.iter().any(|chunk| chunk.contains("1,000")));
        assert!(chunks.iter().any(|chunk| chunk.contains("3.5")));
        assert_eq!(chunks.join(" "), text);
    }
}
