use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use rustc_hash::FxHashSet;

use crate::error::Result;

/// Front matter keys Zola recognizes at the top level of a page.
pub const ROOT_KEYS: &[&str] = &[
    "title", "description", "date", "updated", "weight", "slug", "draft",
    "render", "aliases", "authors", "path", "template", "in_search_index",
];

/// The timezone used to interpret zone-less front matter dates.
#[derive(Debug, Clone, Copy)]
pub enum Zone {
    Named(Tz),
    Local,
}

impl Zone {
    /// Looks up an IANA zone by name. An empty name means the system-local
    /// zone; an unrecognized name logs a warning and falls back to local
    /// rather than failing the run.
    pub fn new(name: &str) -> Zone {
        if name.is_empty() {
            return Zone::Local;
        }

        match name.parse::<Tz>() {
            Ok(tz) => Zone::Named(tz),
            Err(_) => {
                tracing::warn!(tz = name, "invalid timezone, using local");
                Zone::Local
            }
        }
    }

    /// Resolves a naive wall-clock time in this zone. Returns `None` when
    /// the zone admits no such instant, e.g. inside a DST gap.
    pub(crate) fn resolve(self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            Zone::Named(tz) => {
                tz.from_local_datetime(&naive).earliest().map(|dt| dt.fixed_offset())
            }
            Zone::Local => {
                Local.from_local_datetime(&naive).earliest().map(|dt| dt.fixed_offset())
            }
        }
    }
}

impl Default for Zone {
    fn default() -> Self {
        Zone::Local
    }
}

/// Key classification rules shared by every conversion in a run: which
/// front matter keys belong to `[taxonomies]` and which stay at the root.
/// Everything else lands under `[extra]`.
#[derive(Debug)]
pub struct RuleSet {
    roots: FxHashSet<String>,
    taxonomies: FxHashSet<String>,
}

impl RuleSet {
    pub fn new<T, R>(taxonomies: T, extra_roots: R) -> RuleSet
    where
        T: IntoIterator,
        T::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let mut roots: FxHashSet<String> = ROOT_KEYS.iter().map(|key| key.to_string()).collect();
        roots.extend(extra_roots.into_iter().map(Into::into));

        RuleSet {
            roots,
            taxonomies: taxonomies.into_iter().map(Into::into).collect(),
        }
    }

    /// Taxonomy membership wins over root membership when a key is
    /// configured as both.
    pub fn is_taxonomy(&self, key: &str) -> bool {
        self.taxonomies.contains(key)
    }

    pub fn is_root(&self, key: &str) -> bool {
        self.roots.contains(key)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::new(["tags", "categories"], std::iter::empty::<String>())
    }
}

/// A write capability rooted at the destination directory. A confined root
/// additionally rejects any target that lexically escapes it; a plain root
/// writes wherever it is pointed, which dry runs and tests rely on.
#[derive(Debug)]
pub struct DestRoot {
    root: PathBuf,
    confined: bool,
}

impl DestRoot {
    pub fn plain<P: Into<PathBuf>>(root: P) -> DestRoot {
        DestRoot { root: root.into(), confined: false }
    }

    pub fn confined<P: Into<PathBuf>>(root: P) -> DestRoot {
        DestRoot { root: root.into(), confined: true }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates `dir` and writes `contents` to `file`. A confined root
    /// validates both paths before touching the filesystem. Directory
    /// creation tolerates concurrent creation of the same path by other
    /// workers.
    pub fn write(&self, file: &Path, dir: &Path, contents: &str) -> Result<()> {
        if self.confined {
            self.check(file)?;
            self.check(dir)?;
        }

        fs::create_dir_all(dir)?;
        tracing::debug!(path = %file.display(), "writing file");
        fs::write(file, contents)?;
        Ok(())
    }

    fn check(&self, target: &Path) -> Result<()> {
        let escape = || {
            io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!(
                    "{} escapes the destination root {}",
                    target.display(),
                    self.root.display(),
                ),
            )
        };

        let relative = target.strip_prefix(&self.root).map_err(|_| escape())?;
        for component in relative.components() {
            if !matches!(component, Component::Normal(_)) {
                return Err(escape().into());
            }
        }

        Ok(())
    }
}

/// Per-run conversion configuration, shared read-only across workers.
#[derive(Debug)]
pub struct Context {
    /// Root of the Jekyll site.
    pub source: PathBuf,
    /// Write capability rooted at the Zola site.
    pub dest: DestRoot,
    /// Zone for interpreting front matter dates.
    pub zone: Zone,
    /// Derive `aliases` entries from dated file names.
    pub aliases: bool,
    /// Report writes without performing them.
    pub dry_run: bool,
}
