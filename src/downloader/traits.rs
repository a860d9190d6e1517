// Seams to the two external collaborators: the video-info provider and the
// media merge library. Each is implemented once per integration.

use async_trait::async_trait;
use std::path::Path;

use super::errors::DownloadError;
use super::models::StreamDescriptor;

/// Per-chunk progress callback handed to the transport:
/// (stream being downloaded, bytes remaining for this download).
pub type ChunkCallback<'a> = &'a (dyn Fn(&StreamDescriptor, u64) + Send + Sync);

/// Video-info provider: lists the encodings a platform offers for a URL and
/// downloads one encoding's bytes to a local file.
#[async_trait]
pub trait StreamProvider: Send + Sync {
    /// Name of the provider (for logging)
    fn name(&self) -> &'static str;

    /// Every encoding the platform offers for `url`, unfiltered
    async fn fetch_streams(&self, url: &str) -> Result<Vec<StreamDescriptor>, DownloadError>;

    /// Download one stream's bytes to `dest`. `on_chunk` is invoked for every
    /// received chunk of this download only; legs never share a callback.
    async fn download_to(
        &self,
        stream: &StreamDescriptor,
        dest: &Path,
        on_chunk: ChunkCallback<'_>,
    ) -> Result<(), DownloadError>;
}

/// Media merge library: muxes a video-only file and an audio-only file into
/// one output. May fail on corrupt or mismatched input; must not delete its
/// inputs (cleanup belongs to the caller).
#[async_trait]
pub trait Muxer: Send + Sync {
    /// Name of the merge backend (for logging)
    fn name(&self) -> &'static str;

    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> Result<(), DownloadError>;
}
