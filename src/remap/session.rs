//! Interactive remap session state.
//!
//! Holds everything a front end needs between events: the four paths, the
//! backup flag, the currently running job, a log buffer and a status line.
//! Event handlers call methods on the session instead of sharing globals.

use std::path::PathBuf;

use super::worker::{spawn_remap, RemapEvent, RemapHandle};
use super::{list_label_files, preview_label_file, RemapJob, RemapOptions, RemapPreview};
use crate::classes::{read_class_list, ClassMapping};
use crate::error::RelabelError;

/// Coarse run state shown to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Ready,
    Running,
    Done,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Ready => "Ready",
            SessionStatus::Running => "Running...",
            SessionStatus::Done => "Done",
            SessionStatus::Failed => "Failed",
        }
    }
}

#[derive(Debug)]
pub struct RemapSession {
    pub labels_dir: Option<PathBuf>,
    pub old_classes: Option<PathBuf>,
    pub new_classes: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub options: RemapOptions,
    running: Option<RemapHandle>,
    status: SessionStatus,
    log: Vec<String>,
}

impl Default for RemapSession {
    fn default() -> Self {
        Self {
            labels_dir: None,
            old_classes: None,
            new_classes: None,
            output_dir: None,
            options: RemapOptions::default(),
            running: None,
            status: SessionStatus::Ready,
            log: Vec::new(),
        }
    }
}

impl RemapSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    /// Label file names in the selected label directory.
    pub fn label_files(&self) -> Result<Vec<String>, RelabelError> {
        let labels_dir = require(&self.labels_dir, "labels folder")?;
        list_label_files(labels_dir)
    }

    /// Before/after view of one file from the label directory.
    pub fn preview(&mut self, file_name: &str) -> Result<RemapPreview, RelabelError> {
        let labels_dir = require(&self.labels_dir, "labels folder")?;
        let old = read_class_list(require(&self.old_classes, "old classes file")?)?;
        let new = read_class_list(require(&self.new_classes, "new classes file")?)?;

        let mapping = ClassMapping::new(&old, &new);
        let preview = preview_label_file(&labels_dir.join(file_name), &mapping)?;
        self.log.push(format!(
            "Preview: kept={} changed={}",
            preview.stats.unchanged, preview.stats.changed
        ));
        Ok(preview)
    }

    /// Start a background run. Clears the log; refuses while a run is active.
    pub fn start(&mut self) -> Result<(), RelabelError> {
        if self.running.is_some() {
            return Err(RelabelError::RemapInProgress);
        }

        let job = RemapJob {
            labels_dir: require(&self.labels_dir, "labels folder")?.clone(),
            output_dir: require(&self.output_dir, "output folder")?.clone(),
            old_classes: require(&self.old_classes, "old classes file")?.clone(),
            new_classes: require(&self.new_classes, "new classes file")?.clone(),
            options: self.options.clone(),
        };

        self.log.clear();
        self.status = SessionStatus::Running;
        self.running = Some(spawn_remap(job));
        Ok(())
    }

    /// Drain pending worker events into the log. Returns true once the run
    /// has finished during this call.
    pub fn poll(&mut self) -> bool {
        let Some(handle) = self.running.as_mut() else {
            return false;
        };

        let mut finished = false;
        while let Some(event) = handle.try_recv() {
            match event {
                RemapEvent::Started { labels_dir } => {
                    self.log.push(format!("Remapping {}", labels_dir.display()));
                }
                RemapEvent::Finished(Ok(report)) => {
                    self.log.extend(report.to_string().lines().map(String::from));
                    self.status = SessionStatus::Done;
                    finished = true;
                }
                RemapEvent::Finished(Err(err)) => {
                    self.log.push(format!("Error: {}", err));
                    self.status = SessionStatus::Failed;
                    finished = true;
                }
            }
        }

        if finished {
            self.running = None;
        }
        finished
    }

    /// Poll until the current run finishes.
    pub fn wait(&mut self) {
        while self.running.is_some() {
            if !self.poll() {
                std::thread::sleep(std::time::Duration::from_millis(10));
            }
        }
    }
}

fn require<'a>(
    field: &'a Option<PathBuf>,
    name: &'static str,
) -> Result<&'a PathBuf, RelabelError> {
    field
        .as_ref()
        .filter(|path| !path.as_os_str().is_empty())
        .ok_or(RelabelError::SessionIncomplete { field: name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn session_for(root: &Path) -> RemapSession {
        let labels = root.join("labels");
        fs::create_dir_all(&labels).expect("create labels");
        fs::write(labels.join("b.txt"), "1 0.1 0.2 0.3 0.4\n").expect("write b");
        fs::write(labels.join("a.txt"), "0 0.1 0.2 0.3 0.4\n\n2 1 1 1 1\n").expect("write a");
        fs::write(root.join("old.txt"), "cat\ndog\nbird\n").expect("write old");
        fs::write(root.join("new.txt"), "dog\ncat\n").expect("write new");

        RemapSession {
            labels_dir: Some(labels),
            old_classes: Some(root.join("old.txt")),
            new_classes: Some(root.join("new.txt")),
            output_dir: Some(root.join("out")),
            ..Default::default()
        }
    }

    #[test]
    fn start_requires_all_paths() {
        let mut session = RemapSession::new();
        session.labels_dir = Some(PathBuf::from("labels"));
        let err = session.start().unwrap_err();
        assert!(matches!(err, RelabelError::SessionIncomplete { field: "output folder" }));
        assert_eq!(session.status(), SessionStatus::Ready);
    }

    #[test]
    fn second_start_while_running_is_refused() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut session = session_for(temp.path());

        session.start().expect("first start");
        assert_eq!(session.status(), SessionStatus::Running);
        let err = session.start().unwrap_err();
        assert!(matches!(err, RelabelError::RemapInProgress));

        session.wait();
        assert_eq!(session.status(), SessionStatus::Done);
        assert!(!session.is_running());
        assert!(session
            .log_lines()
            .iter()
            .any(|line| line == "Done. Files=2 Lines=3 Changed=2 Unchanged=1"));
        assert!(temp.path().join("labels_backup/a.txt").is_file());
    }

    #[test]
    fn failed_run_sets_failed_status() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut session = session_for(temp.path());
        session.labels_dir = Some(temp.path().join("nope"));

        session.start().expect("start");
        session.wait();
        assert_eq!(session.status(), SessionStatus::Failed);
        assert!(session.log_lines().iter().any(|line| line.starts_with("Error:")));
    }

    #[test]
    fn label_files_and_preview() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut session = session_for(temp.path());

        assert_eq!(session.label_files().expect("list"), vec!["a.txt", "b.txt"]);

        let preview = session.preview("a.txt").expect("preview");
        assert_eq!(preview.remapped, "1 0.1 0.2 0.3 0.4\n2 1 1 1 1\n");
        assert_eq!(preview.stats.changed, 1);
        assert_eq!(preview.stats.unchanged, 1);
        assert!(!temp.path().join("out").exists());
        assert_eq!(session.log_lines(), ["Preview: kept=1 changed=1"]);
    }
}
