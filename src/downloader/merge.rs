// MergeExecutor - drives the external muxer and cleans up intermediates
//
// Cleanup contract: the two input temporaries are deleted whether the mux
// succeeds or fails, and a partial output is deleted on failure. The video
// temporary in particular must never be left behind on either path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::errors::DownloadError;
use super::traits::Muxer;

pub struct MergeExecutor {
    muxer: Arc<dyn Muxer>,
}

impl MergeExecutor {
    pub fn new(muxer: Arc<dyn Muxer>) -> Self {
        Self { muxer }
    }

    /// Combine `video` and `audio` into `output`, returning the output path.
    pub async fn merge(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
    ) -> Result<PathBuf, DownloadError> {
        log::info!(
            "[Merge] {} merging {} + {} -> {}",
            self.muxer.name(),
            video.display(),
            audio.display(),
            output.display()
        );
        let result = self.muxer.mux(video, audio, output).await;

        remove_quietly(video).await;
        remove_quietly(audio).await;

        match result {
            Ok(()) => Ok(output.to_path_buf()),
            Err(e) => {
                log::error!("[Merge] {} failed: {}", self.muxer.name(), e);
                remove_quietly(output).await;
                Err(match e {
                    merge @ DownloadError::MergeFailed(_) => merge,
                    other => DownloadError::MergeFailed(other.to_string()),
                })
            }
        }
    }
}

/// Best-effort file removal; a missing file is not an error.
pub(crate) async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => log::debug!("[Merge] Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("[Merge] Could not remove {}: {}", path.display(), e),
    }
}
