//! Sequential renaming of image files.
//!
//! Image files directly inside a directory are sorted by name and renamed
//! to `<prefix>_<n><ext>`, with `n` zero-padded to the width of the largest
//! number in the run and the original extension kept as-is.

mod report;

pub use report::{RenameEntry, RenameOutcome, RenameReport};

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::RelabelError;
use crate::listing::{direct_child_files, has_extension};

/// Extensions recognised as images when none are added.
pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 8] = [
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".webp", ".svg",
];

const DIRECTORY: &str = "Directory";

/// Rename options.
#[derive(Clone, Debug)]
pub struct RenameOptions {
    pub start: i64,
    pub prefix: String,
    pub dry_run: bool,
    /// Normalised extensions: lowercase with a leading dot.
    pub extensions: BTreeSet<String>,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            start: 1,
            prefix: "image".to_string(),
            dry_run: false,
            extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl RenameOptions {
    /// Merge extra extensions into the recognised set.
    pub fn with_extensions<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in extra {
            if let Some(ext) = normalize_extension(ext.as_ref()) {
                self.extensions.insert(ext);
            }
        }
        self
    }
}

/// Lowercase an extension and give it a leading dot. Blank input is ignored.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}

/// Validate rename options before touching the filesystem.
pub fn validate_rename_options(opts: &RenameOptions) -> Result<(), RelabelError> {
    if opts.start < 0 {
        return Err(RelabelError::InvalidRenameParams {
            message: "Start number must be non-negative.".to_string(),
        });
    }

    if opts.prefix.contains(['/', '\\']) {
        return Err(RelabelError::InvalidRenameParams {
            message: format!("prefix '{}' must not contain a path separator", opts.prefix),
        });
    }

    Ok(())
}

/// Digit count of the largest number assigned to `count` files from `start`.
pub fn padding_width(start: u64, count: usize) -> usize {
    let max_number = start + (count as u64).saturating_sub(1);
    max_number.to_string().len()
}

/// One planned rename.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedRename {
    pub from: String,
    pub to: String,
}

/// Assign new names to `names` in the order given.
pub fn plan_renames(names: &[String], start: u64, prefix: &str) -> Vec<PlannedRename> {
    let width = padding_width(start, names.len());

    names
        .iter()
        .zip(start..)
        .map(|(name, number)| {
            let ext = Path::new(name)
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default();
            PlannedRename {
                from: name.clone(),
                to: format!("{prefix}_{number:0width$}{ext}"),
            }
        })
        .collect()
}

/// Sorted names of the image files directly inside `dir`.
pub fn list_image_files(
    dir: &Path,
    extensions: &BTreeSet<String>,
) -> Result<Vec<String>, RelabelError> {
    let allowed: Vec<&str> = extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.'))
        .collect();

    let mut names = Vec::new();
    for path in direct_child_files(dir, DIRECTORY)? {
        if !has_extension(&path, &allowed) {
            continue;
        }
        match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => names.push(name.to_string()),
            None => log::warn!("skipping non UTF-8 file name {}", path.display()),
        }
    }

    names.sort();
    Ok(names)
}

/// Rename the image files in `dir` according to `opts`.
///
/// A target name already taken by a different file is skipped, and an OS
/// failure on one file is recorded while the rest continue. In a dry run
/// nothing on disk changes.
pub fn rename_images(dir: &Path, opts: &RenameOptions) -> Result<RenameReport, RelabelError> {
    validate_rename_options(opts)?;
    let start = opts.start as u64;

    let names = list_image_files(dir, &opts.extensions)?;
    let plan = plan_renames(&names, start, &opts.prefix);

    let mut entries = Vec::with_capacity(plan.len());
    for PlannedRename { from, to } in plan {
        let from_path = dir.join(&from);
        let to_path = dir.join(&to);

        let outcome = if from != to && to_path.exists() {
            log::warn!("'{}' already exists, skipping '{}'", to, from);
            RenameOutcome::SkippedExisting
        } else if opts.dry_run {
            RenameOutcome::WouldRename
        } else {
            match fs::rename(&from_path, &to_path) {
                Ok(()) => {
                    log::debug!("renamed {} -> {}", from, to);
                    RenameOutcome::Renamed
                }
                Err(err) => {
                    log::warn!("failed to rename {}: {}", from_path.display(), err);
                    RenameOutcome::Failed(err.to_string())
                }
            }
        };

        entries.push(RenameEntry { from, to, outcome });
    }

    Ok(RenameReport {
        directory: dir.to_path_buf(),
        dry_run: opts.dry_run,
        entries,
    })
}
