use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::context::{Context, RuleSet};
use crate::error::{Error, Result};
use crate::{body, frontmatter, paths, remap, walk};

/// The stages a convertible document moves through. One concrete source
/// dialect exists today; the driver is written against the trait so other
/// dialects can slot in without touching it.
pub trait Document {
    /// Reads the document into memory.
    fn load(&mut self) -> Result<()>;
    /// Locates and pulls out the metadata block.
    fn extract_matter(&mut self) -> Result<()>;
    /// Rewrites the metadata block into the destination format.
    fn transform(&mut self, context: &Context, rules: &RuleSet) -> Result<()>;
    /// Writes the converted document to its derived output path.
    fn save(&self, context: &Context) -> Result<()>;
}

/// Drives one document through the pipeline. Each stage either advances or
/// returns the originating error; `save` is the only stage with a side
/// effect, so a failed document never leaves a partial file behind.
pub fn convert<D: Document>(document: &mut D, context: &Context, rules: &RuleSet) -> Result<()> {
    document.load()?;
    document.extract_matter()?;
    document.transform(context, rules)?;
    document.save(context)
}

/// A Jekyll markdown post: YAML front matter between `---` delimiters,
/// Liquid-flavored body, optionally a date-prefixed file name.
#[derive(Debug)]
pub struct JekyllDocument {
    path: PathBuf,
    content: String,
    matter: String,
}

impl JekyllDocument {
    pub fn new<P: Into<PathBuf>>(path: P) -> JekyllDocument {
        JekyllDocument {
            path: path.into(),
            content: String::new(),
            matter: String::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Document for JekyllDocument {
    fn load(&mut self) -> Result<()> {
        self.content = fs::read_to_string(&self.path)?;
        Ok(())
    }

    fn extract_matter(&mut self) -> Result<()> {
        self.matter = frontmatter::extract(&self.content)
            .map_err(|source| Error::FrontMatter { path: self.path.clone(), source })?
            .to_string();

        Ok(())
    }

    fn transform(&mut self, context: &Context, rules: &RuleSet) -> Result<()> {
        self.matter = remap::remap(&self.matter, &self.path, context, rules)?;
        Ok(())
    }

    fn save(&self, context: &Context) -> Result<()> {
        let (file, dir) = paths::output_paths(&self.path, &context.source, context.dest.path())?;
        let combined = body::combine(&self.matter, &self.content);

        if context.dry_run {
            tracing::info!(path = %file.display(), size = combined.len(), "dry-run: would write");
            return Ok(());
        }

        context.dest.write(&file, &dir, &combined)
    }
}

/// Per-run tallies returned by [`convert_site`]. Walk failures count as
/// failed without counting as dispatched, so `failed` can exceed `total`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Files dispatched into the pipeline.
    pub total: usize,
    /// Files, or walk entries, that failed.
    pub failed: usize,
}

impl Summary {
    pub fn succeeded(&self) -> usize {
        self.total.saturating_sub(self.failed)
    }

    fn merge(self, other: Summary) -> Summary {
        Summary {
            total: self.total + other.total,
            failed: self.failed + other.failed,
        }
    }
}

/// Converts every discovered file, fanning out over the ambient rayon pool.
/// A worker holds its pool slot for the whole pipeline run, making the
/// pool's thread count the admission gate; callers wanting a different cap
/// run this inside a pool of their own. Failures are logged, counted, and
/// isolated to their file; only a failure to list the source root itself
/// aborts the run.
pub fn convert_site(context: &Context, rules: &RuleSet) -> Result<Summary> {
    let files = walk::markdown_files(&context.source)?;

    let summary = files
        .par_bridge()
        .map(|next| {
            let path = match next {
                Ok(path) => path,
                Err(error) => {
                    tracing::error!(%error, "error walking directory");
                    return Summary { total: 0, failed: 1 };
                }
            };

            let mut document = JekyllDocument::new(&path);
            match convert(&mut document, context, rules) {
                Ok(()) => {
                    tracing::info!(file = %path.display(), "converted");
                    Summary { total: 1, failed: 0 }
                }
                Err(error) => {
                    log_failure(&path, &error);
                    Summary { total: 1, failed: 1 }
                }
            }
        })
        .reduce(Summary::default, Summary::merge);

    Ok(summary)
}

fn log_failure(file: &Path, error: &Error) {
    let file = file.display();
    match error {
        Error::FrontMatter { source, .. } => {
            tracing::error!(%file, %source, "front matter error");
        }
        Error::Filename { name, reason } => {
            tracing::error!(%file, name = %name, reason, "filename error");
        }
        Error::Date { value, .. } => {
            tracing::error!(
                %file,
                value = %value,
                reason = "unrecognized format",
                "date parse error",
            );
        }
        error => tracing::error!(%file, %error, "failed to process file"),
    }
}
