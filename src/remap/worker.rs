//! Background execution of a remap job.
//!
//! The job runs on its own thread and reports over a channel, so an
//! interactive caller can keep servicing its own loop. Runs are not
//! cancellable once started.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use super::{remap_by_name, RemapJob, RemapReport};
use crate::error::RelabelError;

/// Messages sent by a running remap worker.
#[derive(Debug)]
pub enum RemapEvent {
    Started { labels_dir: PathBuf },
    Finished(Result<RemapReport, RelabelError>),
}

/// Handle to a remap job running in the background.
#[derive(Debug)]
pub struct RemapHandle {
    events: Receiver<RemapEvent>,
    thread: Option<JoinHandle<()>>,
}

/// Start `job` on a background thread.
pub fn spawn_remap(job: RemapJob) -> RemapHandle {
    let (tx, rx) = mpsc::channel();
    let thread = thread::spawn(move || run_job(job, tx));
    RemapHandle {
        events: rx,
        thread: Some(thread),
    }
}

fn run_job(job: RemapJob, tx: Sender<RemapEvent>) {
    // A dropped receiver means nobody is listening; the run still completes.
    let _ = tx.send(RemapEvent::Started {
        labels_dir: job.labels_dir.clone(),
    });
    let result = remap_by_name(&job);
    if let Err(err) = &result {
        log::error!("remap of {} failed: {}", job.labels_dir.display(), err);
    }
    let _ = tx.send(RemapEvent::Finished(result));
}

impl RemapHandle {
    /// Next pending event, without blocking.
    ///
    /// If the worker died without reporting, a final
    /// `Finished(Err(WorkerPanicked))` is produced once.
    pub fn try_recv(&mut self) -> Option<RemapEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => self.reap(),
        }
    }

    /// Block until the worker finishes and return its result.
    pub fn wait(mut self) -> Result<RemapReport, RelabelError> {
        loop {
            match self.events.recv() {
                Ok(RemapEvent::Finished(result)) => {
                    self.join();
                    return result;
                }
                Ok(RemapEvent::Started { .. }) => continue,
                Err(_) => {
                    self.join();
                    return Err(RelabelError::WorkerPanicked);
                }
            }
        }
    }

    fn reap(&mut self) -> Option<RemapEvent> {
        let thread = self.thread.take()?;
        match thread.join() {
            Ok(()) => None,
            Err(_) => Some(RemapEvent::Finished(Err(RelabelError::WorkerPanicked))),
        }
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
