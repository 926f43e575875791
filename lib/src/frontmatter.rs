use std::borrow::Cow;

use memchr::memmem::Finder;
use once_cell::sync::Lazy;
use thiserror::Error;

/// Opening delimiter: a line of dashes starting the block.
pub const OPENING: &str = "---\n";
/// Closing delimiter: a line of dashes immediately preceded by a newline.
pub const CLOSING: &str = "\n---";

static OPENING_FINDER: Lazy<Finder<'static>> = Lazy::new(|| Finder::new(OPENING));
static CLOSING_FINDER: Lazy<Finder<'static>> = Lazy::new(|| Finder::new(CLOSING));

/// A failure to locate the front matter block boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoundsError {
    #[error("no opening front matter delimiter")]
    MissingOpening,
    #[error("no closing front matter delimiter")]
    MissingClosing,
}

/// Byte range of the front matter content within `input`, delimiters
/// excluded. Shared by [`extract`] and [`strip`] so the two always agree
/// on what constitutes the block.
fn bounds(input: &str) -> Result<(usize, usize), BoundsError> {
    let opening = OPENING_FINDER.find(input.as_bytes())
        .ok_or(BoundsError::MissingOpening)?;

    let start = opening + OPENING.len();
    let end = CLOSING_FINDER.find(input[start..].as_bytes())
        .ok_or(BoundsError::MissingClosing)?;

    Ok((start, start + end))
}

/// Returns the front matter content between the first pair of `---\n` /
/// `\n---` delimiters.
///
/// A document without both delimiters is malformed input, not a document
/// without metadata, and fails with the missing delimiter.
pub fn extract(input: &str) -> Result<&str, BoundsError> {
    let (start, end) = bounds(input)?;
    Ok(&input[start..end])
}

/// Removes the first front matter block, delimiters included, returning the
/// remainder verbatim. A document without a complete block passes through
/// unchanged.
pub fn strip(input: &str) -> Cow<'_, str> {
    let Ok((start, end)) = bounds(input) else {
        return Cow::Borrowed(input);
    };

    let before = &input[..start - OPENING.len()];
    let after = &input[end + CLOSING.len()..];
    if before.is_empty() {
        return Cow::Borrowed(after);
    }

    let mut stripped = String::with_capacity(before.len() + after.len());
    stripped.push_str(before);
    stripped.push_str(after);
    Cow::Owned(stripped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_interior_text() {
        assert_eq!(extract("---\ntitle: Hello\n---\nbody").unwrap(), "title: Hello");
        assert_eq!(
            extract("---\ntitle: Hello\ndate: 2024-01-01\ntags: [a, b]\n---\nbody text").unwrap(),
            "title: Hello\ndate: 2024-01-01\ntags: [a, b]",
        );
        assert_eq!(extract("---\n\n---\nbody").unwrap(), "");
        assert_eq!(extract("---\ntitle: Test\n---\nbody with --- in it").unwrap(), "title: Test");
    }

    #[test]
    fn missing_delimiters_are_errors() {
        assert_eq!(extract("just some text").unwrap_err(), BoundsError::MissingOpening);
        assert_eq!(extract("").unwrap_err(), BoundsError::MissingOpening);
        assert_eq!(
            extract("---\ntitle: Hello\nno closing").unwrap_err(),
            BoundsError::MissingClosing,
        );
    }

    #[test]
    fn strips_the_first_block() {
        assert_eq!(strip("---\ntitle: Hello\n---\nbody text"), "\nbody text");
        assert_eq!(strip("---\ntitle: Hello\n---"), "");
        assert_eq!(strip("prefix---\ntitle: Hello\n---\nbody"), "prefix\nbody");
        assert_eq!(
            strip("---\ntitle: Test\n---\n\nparagraph 1\n\nparagraph 2"),
            "\n\nparagraph 1\n\nparagraph 2",
        );
    }

    #[test]
    fn strip_is_a_no_op_without_a_complete_block() {
        assert_eq!(strip("just body text"), "just body text");
        assert_eq!(strip("---\ntitle: Hello\nno closing"), "---\ntitle: Hello\nno closing");
        assert_eq!(strip(""), "");
    }

    #[test]
    fn strip_and_extract_agree_on_boundaries() {
        let input = "intro\n---\ntitle: X\nlist:\n  - 1\n---\ntail\n";
        let matter = extract(input).unwrap();
        assert_eq!(matter, "title: X\nlist:\n  - 1");

        let block = format!("---\n{matter}\n---");
        assert_eq!(input.replacen(&block, "", 1), strip(input));
    }
}
