// Download pipeline: catalog, planner, task, merge and session layers

pub mod catalog;
pub mod errors;
pub mod merge;
pub mod models;
pub mod planner;
pub mod progress;
pub mod session;
pub mod task;
pub mod traits;
pub mod worker;

#[cfg(test)]
pub(crate) mod mock;

pub use catalog::StreamCatalog;
pub use errors::DownloadError;
pub use merge::MergeExecutor;
pub use models::{
    DownloadOutcome, DownloadPreferences, StreamDescriptor, TaskEvent, TaskState,
};
pub use planner::{DownloadPlan, LegStreams};
pub use progress::ProgressReporter;
pub use session::{DownloadSession, SessionConfig};
pub use traits::{Muxer, StreamProvider};
pub use worker::DownloadWorker;
