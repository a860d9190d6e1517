// DownloadTask - the asynchronous unit of work
//
// Runs entirely on the background worker. Consults the planner, drives the
// download legs with per-leg progress, invokes the merge executor when the
// plan calls for it, and reports exactly one terminal event. Every failure is
// caught at this boundary; nothing escapes to crash the process.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;

use super::catalog::StreamCatalog;
use super::errors::DownloadError;
use super::merge::{remove_quietly, MergeExecutor};
use super::models::{
    DownloadOutcome, DownloadPreferences, StreamDescriptor, TaskEvent, TaskState,
    AUDIO_PART_FILE, COMBINED_FILE, MERGED_FILE, VIDEO_PART_FILE,
};
use super::planner::{self, DownloadPlan};
use super::progress::ProgressReporter;
use super::traits::StreamProvider;

pub struct DownloadTask {
    provider: Arc<dyn StreamProvider>,
    merger: MergeExecutor,
    catalog: Arc<StreamCatalog>,
    selected: StreamDescriptor,
    prefs: DownloadPreferences,
    output_dir: PathBuf,
    state: Arc<Mutex<TaskState>>,
    events: UnboundedSender<TaskEvent>,
}

impl DownloadTask {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        provider: Arc<dyn StreamProvider>,
        merger: MergeExecutor,
        catalog: Arc<StreamCatalog>,
        selected: StreamDescriptor,
        prefs: DownloadPreferences,
        output_dir: PathBuf,
        state: Arc<Mutex<TaskState>>,
        events: UnboundedSender<TaskEvent>,
    ) -> Self {
        Self {
            provider,
            merger,
            catalog,
            selected,
            prefs,
            output_dir,
            state,
            events,
        }
    }

    /// Run to completion. Always emits exactly one terminal event and leaves
    /// the shared state retry-ready.
    pub(crate) async fn run(self) {
        let reporter = ProgressReporter::new(self.events.clone());
        self.set_state(TaskState::Downloading);

        match self.execute(&reporter).await {
            Ok(outcome) => {
                self.set_state(TaskState::Succeeded);
                self.status("Download completed successfully.");
                let _ = self.events.send(TaskEvent::Succeeded(outcome));
            }
            Err(e) => {
                log::error!("[Task] Download failed: {}", e);
                // stronger guarantee than the legacy behavior: task-owned
                // temporaries never survive a failed run
                self.remove_part_files().await;
                self.set_state(TaskState::Failed);
                let _ = self.events.send(TaskEvent::Failed(e.to_string()));
            }
        }
    }

    async fn execute(
        &self,
        reporter: &ProgressReporter,
    ) -> Result<DownloadOutcome, DownloadError> {
        let plan = DownloadPlan::choose(self.prefs, &self.selected);
        log::info!(
            "[Task] Plan {:?} for stream {} ({:?})",
            plan,
            self.selected.handle,
            self.selected.quality_label()
        );

        match plan {
            DownloadPlan::VideoOnly => {
                self.status("Downloading video without audio...");
                let dest = self.output_dir.join(COMBINED_FILE);
                self.download_leg(&self.selected, &dest, reporter).await?;
                // direct paths never create *_part* files; drop leftovers
                // from an earlier separate-leg run
                self.remove_part_files().await;
                Ok(DownloadOutcome {
                    final_file: dest,
                    audio_file: None,
                })
            }
            DownloadPlan::CombinedStream => {
                self.status("Downloading video with audio...");
                let dest = self.output_dir.join(COMBINED_FILE);
                self.download_leg(&self.selected, &dest, reporter).await?;
                self.status("Video downloaded successfully.");
                self.remove_part_files().await;
                Ok(DownloadOutcome {
                    final_file: dest,
                    audio_file: None,
                })
            }
            DownloadPlan::SeparateKeep => {
                let legs = planner::resolve_legs(&self.catalog, &self.selected)?;
                let video_dest = self.output_dir.join(VIDEO_PART_FILE);
                let audio_dest = self.output_dir.join(AUDIO_PART_FILE);

                self.status("Downloading video stream...");
                self.download_leg(&legs.video, &video_dest, reporter).await?;

                self.status("Downloading audio separately...");
                self.download_leg(&legs.audio, &audio_dest, reporter).await?;
                self.status("Audio downloaded successfully.");

                // both files are final outputs on this path; nothing deleted
                Ok(DownloadOutcome {
                    final_file: video_dest,
                    audio_file: Some(audio_dest),
                })
            }
            DownloadPlan::SeparateMerge => {
                let legs = planner::resolve_legs(&self.catalog, &self.selected)?;
                let video_dest = self.output_dir.join(VIDEO_PART_FILE);
                let audio_dest = self.output_dir.join(AUDIO_PART_FILE);

                self.status("Downloading video stream...");
                self.download_leg(&legs.video, &video_dest, reporter).await?;

                self.status("Downloading and combining audio...");
                self.download_leg(&legs.audio, &audio_dest, reporter).await?;

                self.status("Combining video and audio...");
                self.set_state(TaskState::Merging);
                let merged = self.output_dir.join(MERGED_FILE);
                let final_file = self.merger.merge(&video_dest, &audio_dest, &merged).await?;
                self.status("Video and audio combined successfully.");

                Ok(DownloadOutcome {
                    final_file,
                    audio_file: None,
                })
            }
        }
    }

    async fn download_leg(
        &self,
        stream: &StreamDescriptor,
        dest: &Path,
        reporter: &ProgressReporter,
    ) -> Result<(), DownloadError> {
        log::info!(
            "[Task] Downloading stream {} -> {}",
            stream.handle,
            dest.display()
        );
        reporter.begin_leg();
        self.provider
            .download_to(stream, dest, &|s, remaining| reporter.on_chunk(s, remaining))
            .await
    }

    async fn remove_part_files(&self) {
        remove_quietly(&self.output_dir.join(VIDEO_PART_FILE)).await;
        remove_quietly(&self.output_dir.join(AUDIO_PART_FILE)).await;
    }

    fn status(&self, message: &str) {
        log::info!("[Task] {}", message);
        let _ = self.events.send(TaskEvent::Status(message.to_string()));
    }

    fn set_state(&self, next: TaskState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }
}
