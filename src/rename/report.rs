//! Rename run reports.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// What happened to one planned rename.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "error", rename_all = "snake_case")]
pub enum RenameOutcome {
    Renamed,
    WouldRename,
    /// The target name is taken by another file.
    SkippedExisting,
    /// The OS refused the rename.
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenameEntry {
    pub from: String,
    pub to: String,
    #[serde(flatten)]
    pub outcome: RenameOutcome,
}

/// Result of a rename run, in processing order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RenameReport {
    pub directory: PathBuf,
    pub dry_run: bool,
    pub entries: Vec<RenameEntry>,
}

impl RenameReport {
    /// Files renamed, or that would be renamed in a dry run.
    pub fn renamed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, RenameOutcome::Renamed | RenameOutcome::WouldRename))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == RenameOutcome::SkippedExisting)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, RenameOutcome::Failed(_)))
            .count()
    }
}

impl fmt::Display for RenameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return writeln!(f, "No image files found in the directory.");
        }

        writeln!(
            f,
            "Found {} image file(s) in '{}'",
            self.entries.len(),
            self.directory.display()
        )?;

        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }

        writeln!(f)?;
        if self.dry_run {
            writeln!(
                f,
                "Dry run complete. Would rename {} file(s).",
                self.renamed_count()
            )
        } else {
            writeln!(
                f,
                "Renaming complete. Successfully renamed {} file(s).",
                self.renamed_count()
            )
        }
    }
}

impl fmt::Display for RenameEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            RenameOutcome::Renamed => write!(f, "Renamed: '{}' -> '{}'", self.from, self.to),
            RenameOutcome::WouldRename => {
                write!(f, "Would rename: '{}' -> '{}'", self.from, self.to)
            }
            RenameOutcome::SkippedExisting => write!(
                f,
                "Warning: '{}' already exists. Skipping '{}'",
                self.to, self.from
            ),
            RenameOutcome::Failed(err) => write!(f, "Error renaming '{}': {}", self.from, err),
        }
    }
}
