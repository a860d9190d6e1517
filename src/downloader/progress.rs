// ProgressReporter - converts raw byte counts into percentage events
//
// The transport invokes on_chunk for every received chunk of the current leg
// only; the reporter carries no memory of a previous leg's bytes. A task
// downloading two legs calls begin_leg before each one so the percentage
// restarts from zero.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::mpsc::UnboundedSender;

use super::models::{StreamDescriptor, TaskEvent};

pub struct ProgressReporter {
    events: UnboundedSender<TaskEvent>,
    /// f32 bits of the highest percentage seen this leg
    last_percent: AtomicU32,
    /// one unknown-size report per leg, not one per chunk
    warned_unknown_size: AtomicBool,
}

impl ProgressReporter {
    pub fn new(events: UnboundedSender<TaskEvent>) -> Self {
        Self {
            events,
            last_percent: AtomicU32::new(0f32.to_bits()),
            warned_unknown_size: AtomicBool::new(false),
        }
    }

    /// Start a new download leg: percentage restarts from zero.
    pub fn begin_leg(&self) {
        self.last_percent.store(0f32.to_bits(), Ordering::Relaxed);
        self.warned_unknown_size.store(false, Ordering::Relaxed);
        let _ = self.events.send(TaskEvent::Progress(0.0));
    }

    /// Per-chunk callback from the download transport.
    ///
    /// Never panics across this boundary: an unknown total size is reported
    /// to the status sink instead of dividing by zero, and the emitted
    /// percentage is clamped to [0, 100] and monotone within the leg.
    pub fn on_chunk(&self, stream: &StreamDescriptor, bytes_remaining: u64) {
        let total = stream.filesize;
        if total == 0 {
            if !self.warned_unknown_size.swap(true, Ordering::Relaxed) {
                log::warn!(
                    "[Progress] Stream {} reports no total size; progress unavailable",
                    stream.handle
                );
                let _ = self
                    .events
                    .send(TaskEvent::Status("Error showing progress".to_string()));
            }
            return;
        }

        let downloaded = total.saturating_sub(bytes_remaining);
        let raw = (downloaded as f64 / total as f64 * 100.0) as f32;
        let clamped = raw.clamp(0.0, 100.0);

        let last = f32::from_bits(self.last_percent.load(Ordering::Relaxed));
        let percent = if clamped < last { last } else { clamped };
        self.last_percent.store(percent.to_bits(), Ordering::Relaxed);

        let _ = self.events.send(TaskEvent::Progress(percent));
    }
}
