use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Splits a `YYYY-MM-DD-slug.md` file name into its four components, with
/// zero-padding preserved verbatim. Names that are not markdown or that
/// lack the fixed-width dated prefix fail with a filename error.
pub fn alias_parts(name: &str) -> Result<(&str, &str, &str, &str)> {
    let Some(stem) = name.strip_suffix(".md") else {
        return Err(Error::Filename { name: name.into(), reason: "not a .md file" });
    };

    if !has_date_prefix(stem.as_bytes()) {
        return Err(Error::Filename {
            name: name.into(),
            reason: "expected YYYY-MM-DD-slug.md format",
        });
    }

    Ok((&stem[0..4], &stem[5..7], &stem[8..10], &stem[11..]))
}

/// Removes a leading `YYYY-MM-DD-` prefix from a file name. Only exact
/// widths with all-digit date fields qualify; lookalike prefixes are left
/// untouched.
///
/// ```
/// use molt::paths::strip_date_prefix;
///
/// assert_eq!(strip_date_prefix("2024-01-21-amazing-node-red.md"), "amazing-node-red.md");
/// assert_eq!(strip_date_prefix("no-date-prefix.md"), "no-date-prefix.md");
/// assert_eq!(strip_date_prefix("2024-1-1-short-date.md"), "2024-1-1-short-date.md");
/// ```
pub fn strip_date_prefix(name: &str) -> &str {
    if has_date_prefix(name.as_bytes()) {
        &name[11..]
    } else {
        name
    }
}

fn has_date_prefix(bytes: &[u8]) -> bool {
    bytes.len() >= 11
        && is_digits(&bytes[0..4]) && bytes[4] == b'-'
        && is_digits(&bytes[5..7]) && bytes[7] == b'-'
        && is_digits(&bytes[8..10]) && bytes[10] == b'-'
}

fn is_digits(bytes: &[u8]) -> bool {
    !bytes.is_empty() && bytes.iter().all(u8::is_ascii_digit)
}

/// Derives where a converted file lands: its path relative to the source
/// root, with the leading underscore dropped from the first segment and the
/// date prefix stripped from the file name, rooted under
/// `<dest_root>/content`. Returns the output file path and its directory.
pub fn output_paths(
    file: &Path,
    source_root: &Path,
    dest_root: &Path,
) -> Result<(PathBuf, PathBuf)> {
    let relative = file.strip_prefix(source_root).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not under the source root {}", file.display(), source_root.display()),
        )
    })?;

    let mut segments = relative.components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>();

    if let Some(first) = segments.first_mut() {
        if first.starts_with('_') {
            first.remove(0);
        }
    }

    let Some(name) = segments.pop() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no path below the source root", file.display()),
        )
        .into());
    };

    let mut dir = dest_root.join("content");
    for segment in &segments {
        if !segment.is_empty() {
            dir.push(segment);
        }
    }

    let output = dir.join(strip_date_prefix(&name));
    Ok((output, dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_parts_of_dated_names() {
        assert_eq!(
            alias_parts("2024-01-21-amazing-node-red.md").unwrap(),
            ("2024", "01", "21", "amazing-node-red"),
        );
        assert_eq!(
            alias_parts("2017-02-10-concordance.md").unwrap(),
            ("2017", "02", "10", "concordance"),
        );
    }

    #[test]
    fn alias_parts_rejects_other_shapes() {
        assert!(matches!(
            alias_parts("2024-01-21-post.html").unwrap_err(),
            Error::Filename { reason: "not a .md file", .. },
        ));
        assert!(matches!(
            alias_parts("no-date.md").unwrap_err(),
            Error::Filename { reason: "expected YYYY-MM-DD-slug.md format", .. },
        ));
        assert!(alias_parts("short.md").is_err());
        assert!(alias_parts("20240121-post.md").is_err());
        assert!(alias_parts("abcd-ef-gh-slug.md").is_err());
        assert!(alias_parts("").is_err());
    }

    #[test]
    fn strips_exact_date_prefixes_only() {
        assert_eq!(strip_date_prefix("2024-01-21-amazing-node-red.md"), "amazing-node-red.md");
        assert_eq!(strip_date_prefix("2017-02-10-concordance.md"), "concordance.md");
        assert_eq!(strip_date_prefix("no-date-prefix.md"), "no-date-prefix.md");
        assert_eq!(strip_date_prefix("2024-1-1-short-date.md"), "2024-1-1-short-date.md");
        assert_eq!(strip_date_prefix("2024-01-21-"), "");
        assert_eq!(strip_date_prefix(""), "");
    }

    #[test]
    fn derives_output_paths() {
        let (file, dir) = output_paths(
            Path::new("/site/jekyll/_posts/2024-01-21-hello-world.md"),
            Path::new("/site/jekyll"),
            Path::new("/site/zola"),
        )
        .unwrap();
        assert_eq!(file, Path::new("/site/zola/content/posts/hello-world.md"));
        assert_eq!(dir, Path::new("/site/zola/content/posts"));

        let (file, dir) = output_paths(
            Path::new("/site/jekyll/_drafts/no-date.md"),
            Path::new("/site/jekyll"),
            Path::new("/site/zola"),
        )
        .unwrap();
        assert_eq!(file, Path::new("/site/zola/content/drafts/no-date.md"));
        assert_eq!(dir, Path::new("/site/zola/content/drafts"));
    }

    #[test]
    fn nested_directories_survive_derivation() {
        let (file, dir) = output_paths(
            Path::new("/site/jekyll/_posts/news/2024-01-21-launch.md"),
            Path::new("/site/jekyll"),
            Path::new("/site/zola"),
        )
        .unwrap();
        assert_eq!(file, Path::new("/site/zola/content/posts/news/launch.md"));
        assert_eq!(dir, Path::new("/site/zola/content/posts/news"));
    }

    #[test]
    fn output_paths_require_files_under_the_source_root() {
        assert!(output_paths(
            Path::new("/elsewhere/post.md"),
            Path::new("/site/jekyll"),
            Path::new("/site/zola"),
        )
        .is_err());
    }
}
