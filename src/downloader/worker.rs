// DownloadWorker - bounded background executor of size one
//
// The capacity of one is itself the concurrency-limiting device: one spawned
// consumer loop runs jobs strictly one after another, and the session rejects
// duplicate download requests before they ever reach the pool.

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

use super::errors::DownloadError;

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

pub struct DownloadWorker {
    jobs: mpsc::Sender<Job>,
}

impl DownloadWorker {
    /// Spawn the worker loop on the current tokio runtime.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::channel::<Job>(1);
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                job.await;
            }
            log::debug!("[Worker] Job channel closed, worker exiting");
        });
        Self { jobs: tx }
    }

    /// Submit a job without waiting. Fails when the worker is saturated;
    /// the session's admission check makes that the exceptional case.
    pub fn submit<F>(&self, job: F) -> Result<(), DownloadError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.jobs
            .try_send(Box::pin(job))
            .map_err(|_| DownloadError::DownloadInProgress)
    }
}
