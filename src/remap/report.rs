//! Remap run statistics and reports.

use serde::Serialize;
use std::fmt;
use std::ops::AddAssign;
use std::path::PathBuf;

/// Line counters for one file or a whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LineStats {
    /// Non-blank lines seen.
    pub lines: usize,
    /// Lines whose text differs from the input.
    pub changed: usize,
    /// Lines emitted exactly as read.
    pub unchanged: usize,
}

impl AddAssign for LineStats {
    fn add_assign(&mut self, rhs: Self) {
        self.lines += rhs.lines;
        self.changed += rhs.changed;
        self.unchanged += rhs.unchanged;
    }
}

/// Counters accumulated over a directory run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RemapStats {
    pub files: usize,
    #[serde(flatten)]
    pub lines: LineStats,
}

/// What happened to the sibling backup directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "path", rename_all = "snake_case")]
pub enum BackupOutcome {
    #[default]
    Disabled,
    Created(PathBuf),
    AlreadyExists(PathBuf),
}

/// Result of a full remap run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RemapReport {
    pub output_dir: PathBuf,
    pub backup: BackupOutcome,
    pub stats: RemapStats,
    /// Old class names that had no counterpart in the new list.
    pub unmapped_classes: Vec<String>,
    /// Label files that could not be read or written and were left out.
    pub skipped_files: Vec<String>,
}

impl fmt::Display for RemapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.backup {
            BackupOutcome::Disabled => {}
            BackupOutcome::Created(path) => {
                writeln!(f, "Backup created at: {}", path.display())?
            }
            BackupOutcome::AlreadyExists(path) => {
                writeln!(f, "Backup already exists at: {}", path.display())?
            }
        }

        if !self.unmapped_classes.is_empty() {
            writeln!(
                f,
                "Classes kept unchanged (not in new list): {}",
                self.unmapped_classes.join(", ")
            )?;
        }

        if !self.skipped_files.is_empty() {
            writeln!(f, "Skipped unreadable file(s): {}", self.skipped_files.join(", "))?;
        }

        writeln!(
            f,
            "Done. Files={} Lines={} Changed={} Unchanged={}",
            self.stats.files,
            self.stats.lines.lines,
            self.stats.lines.changed,
            self.stats.lines.unchanged
        )
    }
}

/// Before/after view of one label file.
#[derive(Clone, Debug, Serialize)]
pub struct RemapPreview {
    pub file_name: String,
    pub original: String,
    pub remapped: String,
    pub stats: LineStats,
}

impl fmt::Display for RemapPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Original ({}):", self.file_name)?;
        write!(f, "{}", self.original)?;
        if !self.original.is_empty() && !self.original.ends_with('\n') {
            writeln!(f)?;
        }
        writeln!(f)?;
        writeln!(f, "Remapped preview:")?;
        write!(f, "{}", self.remapped)?;
        writeln!(f)?;
        writeln!(
            f,
            "Preview: kept={} changed={}",
            self.stats.unchanged, self.stats.changed
        )
    }
}
