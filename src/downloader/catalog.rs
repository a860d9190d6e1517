// StreamCatalog - quality label mapping over one fetch session
//
// Queries the provider, filters to the canonical container, sorts by
// resolution descending and labels every stream that has a resolution or a
// bitrate. The full filtered list is retained for leg lookups, which may need
// streams the labelled mapping dropped.

use lazy_static::lazy_static;
use regex::Regex;

use super::errors::DownloadError;
use super::models::{StreamDescriptor, CANONICAL_CONTAINER};
use super::traits::StreamProvider;

lazy_static! {
    // "1080p" / "1080p60"
    static ref HEIGHT_P_RE: Regex = Regex::new(r"^(\d{3,4})p").unwrap();
    // "1920x1080"
    static ref HEIGHT_WH_RE: Regex = Regex::new(r"^\d+x(\d+)$").unwrap();
}

/// Pixel height of a resolution label; zero when unparseable (audio-only
/// streams sort last).
fn resolution_height(resolution: Option<&str>) -> u32 {
    let Some(res) = resolution else { return 0 };

    if let Some(caps) = HEIGHT_P_RE.captures(res) {
        return caps[1].parse().unwrap_or(0);
    }
    if let Some(caps) = HEIGHT_WH_RE.captures(res) {
        return caps[1].parse().unwrap_or(0);
    }
    0
}

/// Selectable mapping of quality labels to stream descriptors for one fetch.
/// Replaced wholesale by the next fetch; read-only during a download.
#[derive(Debug, Clone)]
pub struct StreamCatalog {
    /// All provider streams in the canonical container, resolution descending
    streams: Vec<StreamDescriptor>,
    /// Label -> descriptor, insertion-ordered, labels unique
    entries: Vec<(String, StreamDescriptor)>,
}

impl StreamCatalog {
    /// Query the provider and build the catalog for one session.
    ///
    /// A provider error and an empty result both surface as a fetch failure:
    /// the provider's message is embedded for diagnostics, and zero matching
    /// encodings is never an empty-but-successful catalog.
    pub async fn fetch(
        provider: &dyn StreamProvider,
        url: &str,
    ) -> Result<Self, DownloadError> {
        if url.trim().is_empty() {
            return Err(DownloadError::EmptyUrl);
        }

        log::info!("[Catalog] Fetching streams via {} for {}", provider.name(), url);
        let all = provider.fetch_streams(url).await.map_err(|e| match e {
            fetch @ DownloadError::Fetch(_) => fetch,
            other => DownloadError::Fetch(other.to_string()),
        })?;

        let catalog = Self::build(all);
        if catalog.is_empty() {
            log::warn!("[Catalog] Provider returned no {} streams", CANONICAL_CONTAINER);
            return Err(DownloadError::NoStreamsAvailable);
        }

        log::info!(
            "[Catalog] {} streams, {} quality options",
            catalog.streams.len(),
            catalog.entries.len()
        );
        Ok(catalog)
    }

    /// Filter, sort and label a raw stream list.
    pub fn build(all: Vec<StreamDescriptor>) -> Self {
        let mut streams: Vec<StreamDescriptor> = all
            .into_iter()
            .filter(|s| s.container == CANONICAL_CONTAINER)
            .collect();
        // Stable sort: equal heights keep provider order, so "first match"
        // lookups below still honor the provider's own preference order.
        streams.sort_by_key(|s| std::cmp::Reverse(resolution_height(s.resolution.as_deref())));

        let mut entries: Vec<(String, StreamDescriptor)> = Vec::new();
        for stream in &streams {
            let Some(label) = stream.quality_label() else {
                // neither resolution nor bitrate: not selectable
                continue;
            };
            match entries.iter_mut().find(|(existing, _)| *existing == label) {
                // Upstream duplicate label: last one wins, position kept
                Some(slot) => slot.1 = stream.clone(),
                None => entries.push((label, stream.clone())),
            }
        }

        Self { streams, entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Quality labels in display order (best resolution first).
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|(label, _)| label.clone()).collect()
    }

    pub fn get(&self, label: &str) -> Option<&StreamDescriptor> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, stream)| stream)
    }

    /// First video-only stream at exactly the selected resolution.
    pub fn find_video_leg(&self, resolution: &str) -> Option<&StreamDescriptor> {
        self.streams
            .iter()
            .find(|s| s.is_video_only() && s.resolution.as_deref() == Some(resolution))
    }

    /// First audio-only stream in the canonical container.
    pub fn find_audio_leg(&self) -> Option<&StreamDescriptor> {
        self.streams.iter().find(|s| s.is_audio_only())
    }
}
