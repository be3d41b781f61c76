//! Class-index remapping for YOLO label directories.
//!
//! Only the first token of a label line is ever rewritten. A line is
//! rewritten when it has at least five tokens, its first token parses as an
//! integer, that integer names a class in the old list, and that name exists
//! in the new list. Every other non-blank line passes through verbatim.
//! Rewritten lines are re-joined with single spaces.

mod report;
pub mod session;
pub mod worker;

pub use report::{BackupOutcome, LineStats, RemapPreview, RemapReport, RemapStats};

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::classes::{read_class_list, ClassList, ClassMapping};
use crate::error::RelabelError;
use crate::listing::{direct_child_files, has_extension};

/// File written next to the remapped labels, holding the new class list.
pub const MAPPED_CLASSES_FILE: &str = "classes_mapped.txt";

const LABEL_EXTENSION: &str = "txt";
const MIN_LABEL_TOKENS: usize = 5;
const BACKUP_SUFFIX: &str = "_backup";
const LABELS_DIR: &str = "Labels folder";

/// Remap options.
#[derive(Clone, Debug)]
pub struct RemapOptions {
    /// Copy the label directory to `<name>_backup` before the run.
    pub create_backup: bool,
}

impl Default for RemapOptions {
    fn default() -> Self {
        Self {
            create_backup: true,
        }
    }
}

/// The four paths of a remap run, plus options.
#[derive(Clone, Debug)]
pub struct RemapJob {
    pub labels_dir: PathBuf,
    pub output_dir: PathBuf,
    pub old_classes: PathBuf,
    pub new_classes: PathBuf,
    pub options: RemapOptions,
}

/// Rewrite the class index of a single label line.
///
/// Returns `None` when the line must pass through unchanged.
pub fn remap_line(line: &str, mapping: &ClassMapping) -> Option<String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < MIN_LABEL_TOKENS {
        return None;
    }

    let old_index: i64 = tokens[0].parse().ok()?;
    let old_index = usize::try_from(old_index).ok()?;
    let new_index = mapping.resolve(old_index)?;

    let mut out = new_index.to_string();
    for token in &tokens[1..] {
        out.push(' ');
        out.push_str(token);
    }
    Some(out)
}

/// Remap the contents of one label file.
///
/// Blank lines are dropped. The result is newline-joined with a trailing
/// newline when at least one line remains.
pub fn remap_label_text(content: &str, mapping: &ClassMapping) -> (String, LineStats) {
    let mut stats = LineStats::default();
    let mut out_lines: Vec<String> = Vec::new();

    for line in split_label_lines(content) {
        if line.trim().is_empty() {
            continue;
        }
        stats.lines += 1;

        match remap_line(line, mapping) {
            Some(rewritten) => {
                if rewritten == line {
                    stats.unchanged += 1;
                } else {
                    stats.changed += 1;
                }
                out_lines.push(rewritten);
            }
            None => {
                stats.unchanged += 1;
                out_lines.push(line.to_string());
            }
        }
    }

    let mut text = out_lines.join("\n");
    if !out_lines.is_empty() {
        text.push('\n');
    }
    (text, stats)
}

/// Split label text into lines.
///
/// Breaks on `\n`, `\r\n`, a lone `\r` and the other Unicode line
/// boundaries (`\x0b`, `\x0c`, `\x1c`..`\x1e`, NEL, LS, PS). A final line
/// without a terminator is kept; no empty line follows a trailing break.
pub fn split_label_lines(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = content.char_indices().peekable();
    while let Some((at, ch)) = chars.next() {
        let end = match ch {
            '\r' => match chars.peek() {
                Some(&(next, '\n')) => {
                    chars.next();
                    next + 1
                }
                _ => at + 1,
            },
            '\n' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}'
            | '\u{2028}' | '\u{2029}' => at + ch.len_utf8(),
            _ => continue,
        };
        lines.push(&content[start..at]);
        start = end;
    }
    if start < content.len() {
        lines.push(&content[start..]);
    }
    lines
}

/// Load both class lists from disk and remap the job's label directory.
pub fn remap_by_name(job: &RemapJob) -> Result<RemapReport, RelabelError> {
    ensure_labels_dir(&job.labels_dir)?;
    let old = read_class_list(&job.old_classes)?;
    let new = read_class_list(&job.new_classes)?;
    remap_labels_dir(&job.labels_dir, &job.output_dir, &old, &new, &job.options)
}

/// Remap every `.txt` file directly inside `labels_dir` into `output_dir`.
///
/// Files are processed in sorted name order. The output directory is created
/// if needed and must not be the label directory itself, nor the backup
/// directory when a backup is requested. A file that cannot be read or
/// written is skipped and listed in the report.
pub fn remap_labels_dir(
    labels_dir: &Path,
    output_dir: &Path,
    old: &ClassList,
    new: &ClassList,
    opts: &RemapOptions,
) -> Result<RemapReport, RelabelError> {
    let label_files = collect_label_files(labels_dir)?;
    ensure_output_is_separate(labels_dir, output_dir, opts)?;

    let mapping = ClassMapping::new(old, new);
    for name in mapping.duplicate_new_names() {
        log::warn!(
            "class '{}' appears more than once in the new list; its last index is used",
            name
        );
    }
    for name in mapping.unmapped_names() {
        log::warn!(
            "class '{}' is not in the new list; its lines are kept unchanged",
            name
        );
    }

    let backup = if opts.create_backup {
        backup_labels_dir(labels_dir)?
    } else {
        BackupOutcome::Disabled
    };

    fs::create_dir_all(output_dir)?;

    let mut stats = RemapStats::default();
    let mut skipped_files = Vec::new();
    for label_path in label_files {
        let Some(file_name) = label_path.file_name() else {
            continue;
        };
        let content = match fs::read_to_string(&label_path) {
            Ok(content) => content,
            Err(err) => {
                log::warn!("skipping {}: {}", label_path.display(), err);
                skipped_files.push(file_name.to_string_lossy().into_owned());
                continue;
            }
        };
        let (text, file_stats) = remap_label_text(&content, &mapping);
        if let Err(err) = fs::write(output_dir.join(file_name), text) {
            log::warn!("failed to write remapped {}: {}", label_path.display(), err);
            skipped_files.push(file_name.to_string_lossy().into_owned());
            continue;
        }

        log::debug!(
            "{}: {} line(s), {} changed",
            label_path.display(),
            file_stats.lines,
            file_stats.changed
        );
        stats.files += 1;
        stats.lines += file_stats;
    }

    fs::write(output_dir.join(MAPPED_CLASSES_FILE), new.to_text())?;

    log::info!(
        "remapped {} file(s) into {}: {} changed, {} unchanged",
        stats.files,
        output_dir.display(),
        stats.lines.changed,
        stats.lines.unchanged
    );

    Ok(RemapReport {
        output_dir: output_dir.to_path_buf(),
        backup,
        stats,
        unmapped_classes: mapping.unmapped_names().to_vec(),
        skipped_files,
    })
}

/// Remap one label file in memory, without writing anything.
pub fn preview_label_file(
    path: &Path,
    mapping: &ClassMapping,
) -> Result<RemapPreview, RelabelError> {
    let original = fs::read_to_string(path)?;
    let (remapped, stats) = remap_label_text(&original, mapping);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(RemapPreview {
        file_name,
        original,
        remapped,
        stats,
    })
}

/// Sorted names of the label files a remap run would process.
pub fn list_label_files(labels_dir: &Path) -> Result<Vec<String>, RelabelError> {
    Ok(collect_label_files(labels_dir)?
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect())
}

/// Copy `labels_dir` to its sibling `<name>_backup` unless that exists.
pub fn backup_labels_dir(labels_dir: &Path) -> Result<BackupOutcome, RelabelError> {
    let backup_dir = backup_path(labels_dir)?;
    if backup_dir.exists() {
        log::info!("backup already exists at {}", backup_dir.display());
        return Ok(BackupOutcome::AlreadyExists(backup_dir));
    }

    copy_tree(labels_dir, &backup_dir)?;
    log::info!("backup created at {}", backup_dir.display());
    Ok(BackupOutcome::Created(backup_dir))
}

fn backup_path(labels_dir: &Path) -> Result<PathBuf, RelabelError> {
    let resolved;
    let base = if labels_dir.file_name().is_some() {
        labels_dir
    } else {
        resolved = fs::canonicalize(labels_dir)?;
        resolved.as_path()
    };

    let Some(name) = base.file_name() else {
        return Err(RelabelError::NotFound {
            path: labels_dir.to_path_buf(),
            message: "Labels folder has no name to derive a backup from".to_string(),
        });
    };

    let mut backup_name = OsString::from(name);
    backup_name.push(BACKUP_SUFFIX);
    Ok(base.with_file_name(backup_name))
}

fn copy_tree(src: &Path, dst: &Path) -> Result<(), RelabelError> {
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(std::io::Error::from)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| RelabelError::NotFound {
                path: entry.path().to_path_buf(),
                message: "entry is outside the label directory".to_string(),
            })?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn ensure_labels_dir(labels_dir: &Path) -> Result<(), RelabelError> {
    let meta = fs::metadata(labels_dir)
        .map_err(|err| RelabelError::from_dir_access(labels_dir, LABELS_DIR, err))?;
    if !meta.is_dir() {
        return Err(RelabelError::NotFound {
            path: labels_dir.to_path_buf(),
            message: format!("{LABELS_DIR} not found"),
        });
    }
    Ok(())
}

fn ensure_output_is_separate(
    labels_dir: &Path,
    output_dir: &Path,
    opts: &RemapOptions,
) -> Result<(), RelabelError> {
    let output = comparable_path(output_dir)?;
    if output == comparable_path(labels_dir)? {
        return Err(RelabelError::OutputOverlapsInput {
            path: output_dir.to_path_buf(),
        });
    }
    if opts.create_backup && output == comparable_path(&backup_path(labels_dir)?)? {
        return Err(RelabelError::OutputOverlapsBackup {
            path: output_dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Resolve `path` for comparison, whether or not it exists yet.
fn comparable_path(path: &Path) -> Result<PathBuf, RelabelError> {
    if path.exists() {
        return Ok(fs::canonicalize(path)?);
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) if parent.exists() => {
            Ok(fs::canonicalize(parent)?.join(name))
        }
        _ => Ok(absolute),
    }
}

fn collect_label_files(labels_dir: &Path) -> Result<Vec<PathBuf>, RelabelError> {
    let mut files = direct_child_files(labels_dir, LABELS_DIR)?;
    files.retain(|path| has_extension(path, &[LABEL_EXTENSION]));
    Ok(files)
}

/// Fuzzing entry point for label-text remapping.
#[cfg(feature = "fuzzing")]
pub fn fuzz_remap_label_text(content: &str) {
    let old = ClassList::new(["a", "b", "c"]);
    let new = ClassList::new(["c", "a"]);
    let mapping = ClassMapping::new(&old, &new);
    let _ = remap_label_text(content, &mapping);
}
