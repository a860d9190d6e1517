// Common data models for the download pipeline

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The single container format the catalog filters to. Every other container
/// offered by the platform is ignored.
pub const CANONICAL_CONTAINER: &str = "mp4";

// Fixed output file names, relative to the session output directory.
/// Direct downloads (combined stream, or video when audio is not wanted).
pub const COMBINED_FILE: &str = "video.mp4";
/// Video-only leg of a separate-leg download.
pub const VIDEO_PART_FILE: &str = "video_part.mp4";
/// Audio-only leg of a separate-leg download.
pub const AUDIO_PART_FILE: &str = "audio_part.mp4";
/// Merged output of the separate-legs-with-merge path.
pub const MERGED_FILE: &str = "final_video.mp4";

/// One downloadable encoding offered by the video platform.
///
/// Immutable once fetched; owned by the catalog for the lifetime of one fetch
/// session and superseded wholesale by the next fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Opaque provider handle used to start a byte download
    pub handle: String,
    /// Resolution label (e.g. "1080p") when the stream carries video
    pub resolution: Option<String>,
    /// Average audio bitrate (e.g. "128kbps") when the stream carries audio
    pub bitrate: Option<String>,
    /// Container format (mp4, webm, ...)
    pub container: String,
    /// Total size in bytes; zero when the provider does not report one
    pub filesize: u64,
    /// Whether the stream carries an audio track
    pub has_audio: bool,
    /// Whether the stream carries a video track
    pub has_video: bool,
}

impl StreamDescriptor {
    /// Audio track only, no video.
    pub fn is_audio_only(&self) -> bool {
        self.has_audio && !self.has_video
    }

    /// Video track only, no audio.
    pub fn is_video_only(&self) -> bool {
        self.has_video && !self.has_audio
    }

    /// Both tracks in one file; downloadable directly with no merge.
    pub fn is_combined(&self) -> bool {
        self.has_video && self.has_audio
    }

    /// Human-readable quality label ("1080p 128kbps"), joining resolution and
    /// bitrate. None when the descriptor has neither.
    pub fn quality_label(&self) -> Option<String> {
        let label = format!(
            "{} {}",
            self.resolution.as_deref().unwrap_or(""),
            self.bitrate.as_deref().unwrap_or("")
        );
        let label = label.trim().to_string();
        if label.is_empty() {
            None
        } else {
            Some(label)
        }
    }

    /// Build a descriptor from one provider JSON format object
    /// (format_id/ext/vcodec/acodec/height/abr/filesize keys).
    /// Returns None when the object has no usable format id.
    pub fn from_provider_json(value: &serde_json::Value) -> Option<Self> {
        let handle = value["format_id"].as_str()?.to_string();
        let container = value["ext"].as_str().unwrap_or("").to_string();

        let vcodec = value["vcodec"].as_str().unwrap_or("none");
        let acodec = value["acodec"].as_str().unwrap_or("none");
        let has_video = !vcodec.is_empty() && vcodec != "none";
        let has_audio = !acodec.is_empty() && acodec != "none";

        let resolution = if has_video {
            value["height"].as_u64().map(|h| format!("{}p", h))
        } else {
            None
        };
        let bitrate = if has_audio {
            value["abr"].as_f64().map(|b| format!("{:.0}kbps", b))
        } else {
            None
        };

        let filesize = value["filesize"]
            .as_u64()
            .or_else(|| value["filesize_approx"].as_u64())
            .unwrap_or(0);

        Some(Self {
            handle,
            resolution,
            bitrate,
            container,
            filesize,
            has_audio,
            has_video,
        })
    }
}

/// Audio preferences captured at the moment a download is launched;
/// immutable for the task's duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadPreferences {
    /// Download an audio track at all
    pub download_audio: bool,
    /// Keep the audio leg as its own file instead of merging
    pub keep_audio_separate: bool,
}

impl DownloadPreferences {
    /// Keeping audio separate has no meaning without audio; the separate flag
    /// is cleared when audio is not wanted (mirrors the UI toggle).
    pub fn new(download_audio: bool, keep_audio_separate: bool) -> Self {
        Self {
            download_audio,
            keep_audio_separate: download_audio && keep_audio_separate,
        }
    }
}

impl Default for DownloadPreferences {
    fn default() -> Self {
        Self {
            download_audio: true,
            keep_audio_separate: false,
        }
    }
}

/// Lifecycle of the single download task the session may have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    Idle,
    Fetching,
    Ready,
    Downloading,
    Merging,
    Succeeded,
    Failed,
}

impl TaskState {
    /// A second download request must be rejected while busy.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Downloading | Self::Merging)
    }
}

/// What a finished task leaves on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    /// The playable result (direct download, kept video leg, or merged file)
    pub final_file: PathBuf,
    /// The audio leg, present only on the keep-audio-separate path
    pub audio_file: Option<PathBuf>,
}

/// Events emitted by a running download task, terminated by exactly one
/// `Succeeded` or `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskEvent {
    /// Human-readable status line
    Status(String),
    /// Percentage of the current download leg, 0..=100; restarts at zero for
    /// each leg
    Progress(f32),
    /// Terminal: the task finished and these files exist
    Succeeded(DownloadOutcome),
    /// Terminal: human-readable error message; no further events follow
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_label_joins_and_trims() {
        let mut stream = StreamDescriptor {
            handle: "137".to_string(),
            resolution: Some("1080p".to_string()),
            bitrate: None,
            container: "mp4".to_string(),
            filesize: 0,
            has_audio: false,
            has_video: true,
        };
        assert_eq!(stream.quality_label().as_deref(), Some("1080p"));

        stream.bitrate = Some("128kbps".to_string());
        assert_eq!(stream.quality_label().as_deref(), Some("1080p 128kbps"));

        stream.resolution = None;
        assert_eq!(stream.quality_label().as_deref(), Some("128kbps"));

        stream.bitrate = None;
        assert_eq!(stream.quality_label(), None);
    }

    #[test]
    fn preferences_clear_separate_without_audio() {
        let prefs = DownloadPreferences::new(false, true);
        assert!(!prefs.keep_audio_separate);

        let prefs = DownloadPreferences::new(true, true);
        assert!(prefs.keep_audio_separate);
    }

    #[test]
    fn descriptor_from_provider_json() {
        let value: serde_json::Value = serde_json::from_str(
            r#"{
                "format_id": "137",
                "ext": "mp4",
                "vcodec": "avc1.4d401f",
                "acodec": "none",
                "height": 1080,
                "filesize": 100000000
            }"#,
        )
        .unwrap();

        let stream = StreamDescriptor::from_provider_json(&value).unwrap();
        assert_eq!(stream.handle, "137");
        assert!(stream.is_video_only());
        assert_eq!(stream.resolution.as_deref(), Some("1080p"));
        assert_eq!(stream.bitrate, None);
        assert_eq!(stream.filesize, 100_000_000);
    }

    #[test]
    fn descriptor_json_falls_back_to_approx_size() {
        let value: serde_json::Value = serde_json::from_str(
            r#"{
                "format_id": "140",
                "ext": "mp4",
                "vcodec": "none",
                "acodec": "mp4a.40.2",
                "abr": 129.5,
                "filesize_approx": 5000000
            }"#,
        )
        .unwrap();

        let stream = StreamDescriptor::from_provider_json(&value).unwrap();
        assert!(stream.is_audio_only());
        assert_eq!(stream.bitrate.as_deref(), Some("130kbps"));
        assert_eq!(stream.filesize, 5_000_000);
    }
}
