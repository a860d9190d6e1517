// Error taxonomy for the download pipeline

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// Provider failed to list encodings (bad URL, network, upstream error)
    #[error("unable to fetch video details: {0}")]
    Fetch(String),

    /// The fetch produced zero usable encodings
    #[error("no MP4 streams available")]
    NoStreamsAvailable,

    /// A download was requested before any quality was chosen
    #[error("no quality selected")]
    NoQualitySelected,

    /// The requested label is not in the current catalog
    #[error("unknown quality option: {0}")]
    UnknownQuality(String),

    /// The planner could not find a stream for a required leg
    #[error("no {kind} stream available for {detail}")]
    NoMatchingStream {
        kind: &'static str,
        detail: String,
    },

    /// Network or provider failure mid-download
    #[error("download failed: {0}")]
    Transport(String),

    /// The media library could not combine the two tracks
    #[error("failed to merge video and audio: {0}")]
    MergeFailed(String),

    /// At most one download may be in flight at a time
    #[error("a download is already in progress")]
    DownloadInProgress,

    #[error("no URL entered")]
    EmptyUrl,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// Whether this error was raised at the call site, before any task was
    /// scheduled (nothing to clean up, no state to reset).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::DownloadInProgress | Self::NoQualitySelected | Self::EmptyUrl
        )
    }
}
