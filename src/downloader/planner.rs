// DownloadPlanner - decides which of the four execution paths to take
//
// The decision is a pure function of the preferences and the selected
// stream's audio flag. Leg resolution is separate so the task can fail before
// any bytes are written when a required leg stream is missing.

use super::catalog::StreamCatalog;
use super::errors::DownloadError;
use super::models::{DownloadPreferences, StreamDescriptor, CANONICAL_CONTAINER};

/// One of the four execution paths for a requested download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPlan {
    /// Audio not wanted: download the selected stream as the final file
    VideoOnly,
    /// Selected stream already carries both tracks: direct download
    CombinedStream,
    /// Video and audio legs downloaded and kept as two separate files
    SeparateKeep,
    /// Video and audio legs downloaded to temporaries and merged into one
    SeparateMerge,
}

impl DownloadPlan {
    /// Decision table over (download_audio, has_audio_track,
    /// keep_audio_separate); deterministic for a fixed triple.
    pub fn choose(prefs: DownloadPreferences, selected: &StreamDescriptor) -> Self {
        if !prefs.download_audio {
            Self::VideoOnly
        } else if selected.has_audio {
            Self::CombinedStream
        } else if prefs.keep_audio_separate {
            Self::SeparateKeep
        } else {
            Self::SeparateMerge
        }
    }

    /// Whether this path downloads two separate legs.
    pub fn has_separate_legs(&self) -> bool {
        matches!(self, Self::SeparateKeep | Self::SeparateMerge)
    }
}

/// The resolved streams for the two legs of a separate-leg plan.
#[derive(Debug, Clone)]
pub struct LegStreams {
    pub video: StreamDescriptor,
    pub audio: StreamDescriptor,
}

/// Resolve both leg streams up front. Video: first video-only stream at the
/// selected resolution. Audio: first audio-only stream in the canonical
/// container. Either lookup failing aborts the task before any download.
pub fn resolve_legs(
    catalog: &StreamCatalog,
    selected: &StreamDescriptor,
) -> Result<LegStreams, DownloadError> {
    let resolution =
        selected
            .resolution
            .as_deref()
            .ok_or(DownloadError::NoMatchingStream {
                kind: "video-only",
                detail: "selected stream has no resolution".to_string(),
            })?;

    let video = catalog
        .find_video_leg(resolution)
        .cloned()
        .ok_or_else(|| DownloadError::NoMatchingStream {
            kind: "video-only",
            detail: resolution.to_string(),
        })?;

    let audio = catalog
        .find_audio_leg()
        .cloned()
        .ok_or(DownloadError::NoMatchingStream {
            kind: "audio-only",
            detail: CANONICAL_CONTAINER.to_string(),
        })?;

    Ok(LegStreams { video, audio })
}
