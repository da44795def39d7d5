//! Whitespace normalisation for extracted text.
//!
//! PDF text layers and OCR output are full of layout artefacts: hard line
//! breaks in the middle of sentences, runs of spaces used for alignment,
//! trailing whitespace per line. None of it carries meaning once the text is
//! headed for translation and speech synthesis, so everything collapses to
//! single spaces before the pipeline continues.

/// Collapse all whitespace in `raw` to single spaces and trim the ends.
///
/// Newlines are treated like any other whitespace. The function is pure,
/// total, and idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_newlines_and_space_runs() {
        assert_eq!(normalize("a\n\nb   c"), "a b c");
    }

    #[test]
    fn trims_leading_and_trailing_whitespace() {
        assert_eq!(normalize("  hello world \n"), "hello world");
    }

    #[test]
    fn empty_and_blank_inputs_yield_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\r\n "), "");
    }

    #[test]
    fn idempotent() {
        let cases = ["", "  ", "a\n\nb   c", "already normal", "\tmix\r\nof all\u{a0}kinds "];
        for s in cases {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn preserves_word_order() {
        assert_eq!(
            normalize("first\nsecond\n\nthird fourth"),
            "first second third fourth"
        );
    }
}
