// DownloadSession - the front door for one fetch-then-download cycle
//
// Owns the catalog, the shared task state and the single background worker.
// Admission control lives here: a fetch or download request against a busy
// session is rejected before anything reaches the worker, so the one queued
// slot is only ever filled by an admitted task.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use super::catalog::StreamCatalog;
use super::errors::DownloadError;
use super::merge::MergeExecutor;
use super::models::{DownloadPreferences, TaskEvent, TaskState};
use super::task::DownloadTask;
use super::traits::{Muxer, StreamProvider};
use super::worker::DownloadWorker;

/// Where a session writes its output files.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub output_dir: PathBuf,
}

impl SessionConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// The platform download directory, when the OS reports one.
    pub fn in_download_dir() -> Self {
        Self {
            output_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            output_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

pub struct DownloadSession {
    provider: Arc<dyn StreamProvider>,
    muxer: Arc<dyn Muxer>,
    worker: DownloadWorker,
    config: SessionConfig,
    catalog: Option<Arc<StreamCatalog>>,
    state: Arc<Mutex<TaskState>>,
}

impl DownloadSession {
    /// Build a session and spawn its worker on the current tokio runtime.
    pub fn new(
        provider: Arc<dyn StreamProvider>,
        muxer: Arc<dyn Muxer>,
        config: SessionConfig,
    ) -> Self {
        Self {
            provider,
            muxer,
            worker: DownloadWorker::spawn(),
            config,
            catalog: None,
            state: Arc::new(Mutex::new(TaskState::Idle)),
        }
    }

    /// Fetch the stream catalog for `url`, replacing any previous catalog.
    ///
    /// Returns the quality labels in display order. On failure the old
    /// catalog is discarded too; a stale quality list must never survive a
    /// failed fetch of a new URL.
    pub async fn fetch(&mut self, url: &str) -> Result<Vec<String>, DownloadError> {
        if self.state().is_busy() {
            return Err(DownloadError::DownloadInProgress);
        }

        self.catalog = None;
        self.set_state(TaskState::Fetching);

        match StreamCatalog::fetch(self.provider.as_ref(), url).await {
            Ok(catalog) => {
                let labels = catalog.labels();
                self.catalog = Some(Arc::new(catalog));
                self.set_state(TaskState::Ready);
                Ok(labels)
            }
            Err(e) => {
                log::error!("[Session] Fetch failed: {}", e);
                self.set_state(TaskState::Idle);
                Err(e)
            }
        }
    }

    /// Launch a download of the stream behind `label` on the background
    /// worker. Returns the event stream for this task; the caller consumes it
    /// until the terminal `Succeeded` or `Failed` event.
    pub fn request_download(
        &self,
        label: &str,
        prefs: DownloadPreferences,
    ) -> Result<UnboundedReceiver<TaskEvent>, DownloadError> {
        if self.state().is_busy() {
            return Err(DownloadError::DownloadInProgress);
        }
        if label.trim().is_empty() {
            return Err(DownloadError::NoQualitySelected);
        }
        let catalog = self
            .catalog
            .clone()
            .ok_or(DownloadError::NoQualitySelected)?;
        let selected = catalog
            .get(label)
            .cloned()
            .ok_or_else(|| DownloadError::UnknownQuality(label.to_string()))?;

        log::info!(
            "[Session] Starting download of {:?} into {}",
            label,
            self.config.output_dir.display()
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let task = DownloadTask::new(
            self.provider.clone(),
            MergeExecutor::new(self.muxer.clone()),
            catalog,
            selected,
            prefs,
            self.config.output_dir.clone(),
            self.state.clone(),
            tx,
        );

        let previous = self.state();
        self.set_state(TaskState::Downloading);
        if let Err(e) = self.worker.submit(task.run()) {
            // admission said idle but the worker slot is still draining
            self.set_state(previous);
            return Err(e);
        }
        Ok(rx)
    }

    /// Drop the catalog and return to idle. Rejected while a task is running.
    pub fn reset(&mut self) -> Result<(), DownloadError> {
        if self.state().is_busy() {
            return Err(DownloadError::DownloadInProgress);
        }
        self.catalog = None;
        self.set_state(TaskState::Idle);
        Ok(())
    }

    /// Quality labels of the current catalog, best resolution first.
    pub fn quality_labels(&self) -> Vec<String> {
        self.catalog
            .as_ref()
            .map(|c| c.labels())
            .unwrap_or_default()
    }

    pub fn state(&self) -> TaskState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(TaskState::Failed)
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    fn set_state(&self, next: TaskState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }
}
