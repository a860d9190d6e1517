// Test doubles for the provider and muxer seams
//
// FakeProvider serves a canned stream list and simulates chunked byte
// downloads; FakeMuxer concatenates its inputs or fails on demand. Both
// record enough to assert call order and counts.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::errors::DownloadError;
use super::models::StreamDescriptor;
use super::traits::{ChunkCallback, Muxer, StreamProvider};

pub(crate) fn video_only(handle: &str, resolution: &str, filesize: u64) -> StreamDescriptor {
    StreamDescriptor {
        handle: handle.to_string(),
        resolution: Some(resolution.to_string()),
        bitrate: None,
        container: "mp4".to_string(),
        filesize,
        has_audio: false,
        has_video: true,
    }
}

pub(crate) fn audio_only(handle: &str, bitrate: &str, filesize: u64) -> StreamDescriptor {
    StreamDescriptor {
        handle: handle.to_string(),
        resolution: None,
        bitrate: Some(bitrate.to_string()),
        container: "mp4".to_string(),
        filesize,
        has_audio: true,
        has_video: false,
    }
}

pub(crate) fn combined(
    handle: &str,
    resolution: &str,
    bitrate: &str,
    filesize: u64,
) -> StreamDescriptor {
    StreamDescriptor {
        handle: handle.to_string(),
        resolution: Some(resolution.to_string()),
        bitrate: Some(bitrate.to_string()),
        container: "mp4".to_string(),
        filesize,
        has_audio: true,
        has_video: true,
    }
}

pub(crate) struct FakeProvider {
    streams: Vec<StreamDescriptor>,
    fetch_error: Option<String>,
    failing_handle: Option<(String, String)>,
    download_delay: Option<std::time::Duration>,
    downloads: Arc<Mutex<Vec<String>>>,
}

impl FakeProvider {
    pub(crate) fn new(streams: Vec<StreamDescriptor>) -> Self {
        Self {
            streams,
            fetch_error: None,
            failing_handle: None,
            download_delay: None,
            downloads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make fetch_streams fail with the given message.
    pub(crate) fn with_fetch_error(mut self, message: &str) -> Self {
        self.fetch_error = Some(message.to_string());
        self
    }

    /// Make download_to fail for one specific stream handle.
    pub(crate) fn failing_download(mut self, handle: &str, message: &str) -> Self {
        self.failing_handle = Some((handle.to_string(), message.to_string()));
        self
    }

    /// Make every download_to call sleep first, keeping the task in flight.
    pub(crate) fn with_download_delay(mut self, delay: std::time::Duration) -> Self {
        self.download_delay = Some(delay);
        self
    }

    pub(crate) fn streams(&self) -> Vec<StreamDescriptor> {
        self.streams.clone()
    }

    /// Handles passed to download_to, in call order.
    pub(crate) fn download_log(&self) -> Arc<Mutex<Vec<String>>> {
        self.downloads.clone()
    }
}

#[async_trait]
impl StreamProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_streams(&self, _url: &str) -> Result<Vec<StreamDescriptor>, DownloadError> {
        if let Some(message) = &self.fetch_error {
            return Err(DownloadError::Transport(message.clone()));
        }
        Ok(self.streams.clone())
    }

    async fn download_to(
        &self,
        stream: &StreamDescriptor,
        dest: &Path,
        on_chunk: ChunkCallback<'_>,
    ) -> Result<(), DownloadError> {
        self.downloads.lock().unwrap().push(stream.handle.clone());

        if let Some(delay) = self.download_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some((handle, message)) = &self.failing_handle {
            if *handle == stream.handle {
                return Err(DownloadError::Transport(message.clone()));
            }
        }

        // four chunks: quarter of the total each
        let total = stream.filesize;
        for step in 1..=4u64 {
            on_chunk(stream, total - total * step / 4);
        }
        tokio::fs::write(dest, format!("bytes of {}", stream.handle)).await?;
        Ok(())
    }
}

pub(crate) struct FakeMuxer {
    failure: Option<String>,
    calls: AtomicUsize,
}

impl FakeMuxer {
    pub(crate) fn new() -> Self {
        Self {
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Make every mux call fail after writing a partial output file.
    pub(crate) fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Muxer for FakeMuxer {
    fn name(&self) -> &'static str {
        "fake-muxer"
    }

    async fn mux(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
    ) -> Result<(), DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.failure {
            // leave a partial file behind, as a crashed mux would
            tokio::fs::write(output, b"partial").await?;
            return Err(DownloadError::MergeFailed(message.clone()));
        }

        let mut merged = tokio::fs::read(video).await.unwrap_or_default();
        merged.extend(tokio::fs::read(audio).await.unwrap_or_default());
        tokio::fs::write(output, merged).await?;
        Ok(())
    }
}
