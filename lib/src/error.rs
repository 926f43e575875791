use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::frontmatter::BoundsError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A per-file conversion failure.
///
/// Every variant carries enough context to diagnose the failing file without
/// consulting anything else. Errors are created at the point of failure and
/// propagated unchanged; the coordinator logs and counts them, so one bad
/// file never stops the rest of a run.
#[derive(Debug, Error)]
pub enum Error {
    /// The document has no extractable front matter block.
    #[error("front matter error in {}: extraction failed: {source}", path.display())]
    FrontMatter { path: PathBuf, source: BoundsError },

    /// The front matter block is not valid YAML (or not a mapping).
    #[error("failed to parse front matter in {}: {source}", path.display())]
    Deserialize { path: PathBuf, source: serde_yaml::Error },

    /// The transformed front matter could not be rendered as TOML.
    #[error("failed to serialize front matter for {}: {source}", path.display())]
    Serialize { path: PathBuf, source: toml::ser::Error },

    /// A filename did not have the shape alias derivation requires.
    #[error("filename error for {name:?}: {reason}")]
    Filename { name: String, reason: &'static str },

    /// A front matter date matched none of the supported formats.
    #[error("date error in {}: could not parse {value:?}: unrecognized format", path.display())]
    Date { path: PathBuf, value: String },

    /// Discovery failed while walking the source tree.
    #[error("error walking {}: {source}", path.display())]
    Walk { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}
