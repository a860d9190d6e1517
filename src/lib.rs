pub mod downloader;
pub mod logging;

pub use downloader::{
    DownloadError, DownloadOutcome, DownloadPreferences, DownloadSession, SessionConfig,
    StreamDescriptor, TaskEvent, TaskState,
};
