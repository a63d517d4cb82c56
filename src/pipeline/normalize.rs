// src/pipeline/normalize.rs

//! Text normalization for hand-edited schedule pages.
//!
//! The source pages are maintained in a visual editor that scatters
//! zero-width separators through the text and swaps hyphens for en/em
//! dashes. Extraction must see through all of that so a re-scrape of an
//! unchanged page produces byte-identical output.

/// Normalize a text fragment.
///
/// Removes U+200B..U+200D and U+FEFF, maps en-dash and em-dash to the ASCII
/// hyphen, and trims surrounding whitespace. Idempotent; never grows the
/// input.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter_map(|c| match c {
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' => None,
            '\u{2013}' | '\u{2014}' => Some('-'),
            other => Some(other),
        })
        .collect();
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_zero_width_characters() {
        assert_eq!(normalize("4:45\u{200B}-6:45\u{FEFF}"), "4:45-6:45");
        assert_eq!(normalize("Wa\u{200C}rr\u{200D}en"), "Warren");
    }

    #[test]
    fn test_unifies_dash_variants() {
        assert_eq!(normalize("4:45\u{2013}6:45"), "4:45-6:45");
        assert_eq!(normalize("4:45\u{2014}6:45"), "4:45-6:45");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(normalize("  Practice, Warren \t"), "Practice, Warren");
    }

    #[test]
    fn test_idempotent() {
        let noisy = " \u{FEFF}Practice\u{200B}, Warren, 4:45\u{2013}6:45  ";
        let once = normalize(noisy);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_length_non_increasing() {
        for sample in ["", "plain", " padded ", "a\u{200B}b", "x\u{2013}y"] {
            assert!(normalize(sample).chars().count() <= sample.chars().count());
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
    }
}
