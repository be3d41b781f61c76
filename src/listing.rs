//! Flat directory listing shared by both tools.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::RelabelError;

/// Regular files directly inside `dir`, sorted by file name.
///
/// Symlinks are followed; entries that cannot be resolved (dangling links,
/// unreadable children) are skipped with a warning. Failure to open `dir`
/// itself is classified into `NotFound` / `PermissionDenied`, with `what`
/// naming the directory in the message.
pub(crate) fn direct_child_files(dir: &Path, what: &str) -> Result<Vec<PathBuf>, RelabelError> {
    let meta = fs::metadata(dir).map_err(|err| RelabelError::from_dir_access(dir, what, err))?;
    if !meta.is_dir() {
        return Err(RelabelError::NotFound {
            path: dir.to_path_buf(),
            message: format!("{what} not found"),
        });
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() > 0 => {
                log::warn!("skipping unreadable entry in {}: {}", dir.display(), err);
                continue;
            }
            Err(err) => return Err(RelabelError::from_dir_access(dir, what, err.into())),
        };

        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Case-insensitive extension check; `allowed` entries carry no leading dot.
pub(crate) fn has_extension<S: AsRef<str>>(path: &Path, allowed: &[S]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext.as_ref()))
}
