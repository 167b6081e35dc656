//! Artist and title cleanup: spacing, stray punctuation and word capitalization.

/// Characters stripped from both ends of an artist/title token.
/// Apostrophes, brackets and `!`/`?` are meaningful and kept.
const STRAY_PUNCTUATION: &[char] = &['-', '–', '—', '_', '.', ',', ';', ':', '|', '~', '"'];

/// Capitalization rules for artist and title tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameStyle {
    /// Words with no lowercase letters and at most this many characters are
    /// kept verbatim ("DJ", "MGMT", "U2"). 0 disables the exception.
    pub max_acronym_len: usize,
}

impl Default for NameStyle {
    fn default() -> Self {
        Self { max_acronym_len: 4 }
    }
}

impl NameStyle {
    /// Clean a raw artist/title token. Returns `None` when nothing is left.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let spaced = raw.replace('_', " ");
        let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
        let trimmed =
            collapsed.trim_matches(|c: char| c.is_whitespace() || STRAY_PUNCTUATION.contains(&c));

        if trimmed.is_empty() {
            return None;
        }

        let words: Vec<String> = trimmed
            .split(' ')
            .map(|word| self.capitalize_word(word))
            .collect();
        Some(words.join(" "))
    }

    fn capitalize_word(&self, word: &str) -> String {
        if self.is_preserved_acronym(word) {
            return word.to_string();
        }

        let mut out = String::with_capacity(word.len());
        let mut seen_letter = false;
        for c in word.chars() {
            if !seen_letter && c.is_alphabetic() {
                seen_letter = true;
                out.push(upper(c));
            } else {
                out.push(lower(c));
            }
        }
        out
    }

    fn is_preserved_acronym(&self, word: &str) -> bool {
        self.max_acronym_len > 0
            && word.chars().count() <= self.max_acronym_len
            && word.chars().any(char::is_uppercase)
            && !word.chars().any(char::is_lowercase)
    }
}

/// Normalize with the default [`NameStyle`].
pub fn normalize(raw: &str) -> Option<String> {
    NameStyle::default().normalize(raw)
}

// Single-char case mappings only: 'ß' -> "SS" would break idempotence.
fn upper(c: char) -> char {
    let mut it = c.to_uppercase();
    match (it.next(), it.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

fn lower(c: char) -> char {
    let mut it = c.to_lowercase();
    match (it.next(), it.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underscores_become_spaces() {
        assert_eq!(normalize("Daft_Punk").as_deref(), Some("Daft Punk"));
        assert_eq!(normalize("One_More_Time").as_deref(), Some("One More Time"));
    }

    #[test]
    fn apostrophes_do_not_split_words() {
        assert_eq!(normalize("goin_on").as_deref(), Some("Goin On"));
        assert_eq!(normalize("ain't_no").as_deref(), Some("Ain't No"));
        assert_eq!(normalize("goin'").as_deref(), Some("Goin'"));
        assert_eq!(normalize("rock 'n' roll").as_deref(), Some("Rock 'N' Roll"));
    }

    #[test]
    fn lowercases_the_rest_of_each_word() {
        assert_eq!(normalize("hOLE in the earth").as_deref(), Some("Hole In The Earth"));
        assert_eq!(normalize("TOO_OLD_TOO_FREEZING").as_deref(), Some("TOO OLD TOO Freezing"));
    }

    #[test]
    fn short_acronyms_preserved() {
        assert_eq!(normalize("DJ Shadow").as_deref(), Some("DJ Shadow"));
        assert_eq!(normalize("nin vs MGMT").as_deref(), Some("Nin Vs MGMT"));
        assert_eq!(normalize("U2").as_deref(), Some("U2"));
        // Five letters is over the limit
        assert_eq!(normalize("ABBA GHOST").as_deref(), Some("ABBA Ghost"));
    }

    #[test]
    fn acronym_exception_can_be_disabled() {
        let style = NameStyle { max_acronym_len: 0 };
        assert_eq!(style.normalize("DJ Shadow").as_deref(), Some("Dj Shadow"));
    }

    #[test]
    fn trims_stray_punctuation_and_whitespace() {
        assert_eq!(normalize("  - Title -_ ").as_deref(), Some("Title"));
        assert_eq!(normalize("Song.").as_deref(), Some("Song"));
        assert_eq!(normalize("Help!").as_deref(), Some("Help!"));
        assert_eq!(normalize("Title (Live)").as_deref(), Some("Title (Live)"));
    }

    #[test]
    fn collapses_repeated_whitespace() {
        assert_eq!(normalize("a  b\t\tc").as_deref(), Some("A B C"));
        assert_eq!(normalize("a__b").as_deref(), Some("A B"));
    }

    #[test]
    fn first_letter_after_leading_symbols() {
        assert_eq!(normalize("2pac").as_deref(), Some("2Pac"));
        assert_eq!(normalize("(intro)").as_deref(), Some("(Intro)"));
    }

    #[test]
    fn empty_input_is_none() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   "), None);
        assert_eq!(normalize("_-_"), None);
    }

    #[test]
    fn idempotent() {
        let samples = [
            "Daft_Punk",
            "ain't_no",
            "a",
            "ABBA GHOST",
            "straße",
            "ßeta",
            "日ABCDE",
            "  weird --  input__",
            "AC/DC - back in BLACK",
            "İstanbul",
            "x264-DVDRip",
        ];
        for s in samples {
            let once = normalize(s);
            let twice = once.as_deref().and_then(normalize);
            assert_eq!(once, twice, "not idempotent for {s:?}");
        }
    }
}
