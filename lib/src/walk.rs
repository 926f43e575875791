use std::path::{Path, PathBuf};
use std::{fs, io};

use crate::error::{Error, Result};

/// Lazily yields the `.md` files under the underscore-prefixed top-level
/// directories of `root`, in sorted order. Consumers can start on early
/// files while later directories are still being read, and dropping the
/// iterator abandons the walk cleanly. Only a failure to list `root` itself
/// is fatal; failures deeper in the tree are yielded inline so one bad
/// entry cannot end the run.
pub fn markdown_files(root: &Path) -> Result<impl Iterator<Item = Result<PathBuf>> + Send> {
    let fatal = |source| Error::Walk { path: root.to_path_buf(), source };

    let mut dirs = Vec::new();
    for entry in fs::read_dir(root).map_err(fatal)? {
        let entry = entry.map_err(fatal)?;
        if !entry.file_type().map_err(fatal)?.is_dir() {
            continue;
        }

        if entry.file_name().to_string_lossy().starts_with('_') {
            dirs.push(entry.path());
        }
    }

    dirs.sort();

    Ok(dirs.into_iter().flat_map(|dir| {
        // The conversion fan-out saturates the rayon pool, so walk jobs
        // scheduled onto it would never run. Each directory reads serially.
        let walk = jwalk::WalkDir::new(&dir)
            .sort(true)
            .parallelism(jwalk::Parallelism::Serial);
        walk.into_iter().filter_map(move |entry| match entry {
            Ok(entry) if entry.file_type.is_file() => {
                let path = entry.path();
                path.extension().map_or(false, |ext| ext == "md").then(|| Ok(path))
            }
            Ok(_) => None,
            Err(error) => {
                let path = error.path().map(Path::to_path_buf).unwrap_or_else(|| dir.clone());
                let source = error.into_io_error().unwrap_or_else(|| {
                    io::Error::new(io::ErrorKind::Other, "directory walk failed")
                });

                Some(Err(Error::Walk { path, source }))
            }
        })
    }))
}
