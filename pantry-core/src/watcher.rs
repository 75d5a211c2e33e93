//! Polling folder watcher that feeds the ingestion pipeline.
//!
//! The watcher lists the incoming directory on a fixed interval, dispatches
//! each new image file to the pipeline at most once, and forgets a file again
//! if its dispatch fails so the next poll retries it. The "seen" set lives in
//! memory only: a restarted watcher re-dispatches whatever still sits in the
//! directory.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::{Id, JoinError, JoinSet};

use crate::error::IngestError;
use crate::image::is_image_filename;
use crate::pipeline::{IngestOutcome, Ingestor};

/// Counts reported when the watcher stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WatchSummary {
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
}

/// Folder watcher with deterministic dispatch bookkeeping.
///
/// In-flight dispatches are tracked in a task set keyed by filename, so a
/// failed (or panicked) task always un-marks exactly the file it carried.
pub struct Watcher {
    dir: PathBuf,
    interval: Duration,
    ingestor: Arc<dyn Ingestor>,
    seen: HashSet<String>,
    tasks: JoinSet<Result<IngestOutcome, IngestError>>,
    in_flight: HashMap<Id, String>,
    summary: WatchSummary,
}

impl Watcher {
    pub fn new(dir: PathBuf, interval: Duration, ingestor: Arc<dyn Ingestor>) -> Self {
        Self {
            dir,
            interval,
            ingestor,
            seen: HashSet::new(),
            tasks: JoinSet::new(),
            in_flight: HashMap::new(),
            summary: WatchSummary::default(),
        }
    }

    /// Run until Ctrl-C. The interrupt stops future polls; uploads already in
    /// flight are drained to completion before this returns.
    pub async fn run(self) -> WatchSummary {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for interrupt");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `shutdown` completes, then drain in-flight dispatches.
    pub async fn run_until(mut self, shutdown: impl Future<Output = ()>) -> WatchSummary {
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        tracing::error!(dir = %self.dir.display(), error = %e, "failed to list watched directory");
                    }
                }
                Some(joined) = self.tasks.join_next_with_id() => {
                    self.handle_completion(joined);
                }
                _ = &mut shutdown => {
                    tracing::info!(
                        in_flight = self.tasks.len(),
                        "interrupt received, draining in-flight dispatches"
                    );
                    break;
                }
            }
        }
        self.drain().await;
        self.summary
    }

    /// List the directory once and dispatch every new image file. Returns
    /// how many dispatches started.
    pub async fn poll_once(&mut self) -> std::io::Result<usize> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => {
                    tracing::warn!(name = %name.to_string_lossy(), "skipping file with non-UTF-8 name");
                }
            }
        }
        names.sort();

        let mut dispatched = 0;
        for name in names {
            if !is_image_filename(&name) || self.seen.contains(&name) {
                continue;
            }
            // Mark before dispatch: at most one in-flight task per filename.
            self.seen.insert(name.clone());
            let path = self.dir.join(&name);
            let ingestor = Arc::clone(&self.ingestor);
            let handle = self.tasks.spawn(async move { ingestor.ingest(&path).await });
            self.in_flight.insert(handle.id(), name.clone());
            self.summary.dispatched += 1;
            dispatched += 1;
            tracing::info!(file = %name, "dispatched for ingestion");
        }
        Ok(dispatched)
    }

    /// Wait for every in-flight dispatch to finish.
    pub async fn drain(&mut self) {
        while let Some(joined) = self.tasks.join_next_with_id().await {
            self.handle_completion(joined);
        }
    }

    /// Final counts.
    pub fn summary(&self) -> WatchSummary {
        self.summary
    }

    fn handle_completion(
        &mut self,
        joined: Result<(Id, Result<IngestOutcome, IngestError>), JoinError>,
    ) {
        match joined {
            Ok((id, Ok(outcome))) => {
                // Success: the file moved to the processed directory, so the
                // name stays in "seen" and is never re-dispatched.
                self.in_flight.remove(&id);
                self.summary.succeeded += 1;
                tracing::info!(slug = %outcome.slug, url = %outcome.url, "ingestion finished");
            }
            Ok((id, Err(e))) => {
                let name = self.unmark(id);
                self.summary.failed += 1;
                tracing::error!(file = %name, error = %e, "ingestion failed, will retry on next poll");
            }
            Err(join_error) => {
                let name = self.unmark(join_error.id());
                self.summary.failed += 1;
                tracing::error!(file = %name, error = %join_error, "ingestion task aborted, will retry on next poll");
            }
        }
    }

    /// Remove a finished task from the in-flight map and free its filename
    /// for re-dispatch.
    fn unmark(&mut self, id: Id) -> String {
        match self.in_flight.remove(&id) {
            Some(name) => {
                self.seen.remove(&name);
                name
            }
            None => "<unknown>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;

    /// Records every ingest call; fails for configured filenames.
    struct FakeIngestor {
        calls: Mutex<Vec<String>>,
        fail_files: HashSet<String>,
    }

    impl FakeIngestor {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_files: HashSet::new(),
            }
        }

        fn failing(file: &str) -> Self {
            let mut ingestor = Self::new();
            ingestor.fail_files.insert(file.to_string());
            ingestor
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Ingestor for FakeIngestor {
        async fn ingest(&self, path: &Path) -> Result<IngestOutcome, IngestError> {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            self.calls.lock().unwrap().push(name.clone());
            if self.fail_files.contains(&name) {
                return Err(IngestError::RecipeNotFound {
                    slug: name.clone(),
                    file: name,
                });
            }
            Ok(IngestOutcome {
                slug: name.clone(),
                url: format!("https://objects.test/img/{}", name),
                width: 100,
                height: 100,
                archived_path: PathBuf::from("processed").join(name),
                duration_ms: 0,
            })
        }
    }

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"x").unwrap();
    }

    #[tokio::test]
    async fn test_dispatches_each_file_at_most_once() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "saltibarsciai.jpg");

        let ingestor = Arc::new(FakeIngestor::new());
        let mut watcher = Watcher::new(
            dir.path().to_path_buf(),
            Duration::from_secs(2),
            ingestor.clone(),
        );

        assert_eq!(watcher.poll_once().await.unwrap(), 1);
        watcher.drain().await;
        // fake ingestor does not move the file, yet the second poll skips it
        assert_eq!(watcher.poll_once().await.unwrap(), 0);
        watcher.drain().await;

        assert_eq!(ingestor.calls(), vec!["saltibarsciai.jpg"]);
        assert_eq!(watcher.summary().succeeded, 1);
    }

    #[tokio::test]
    async fn test_failed_dispatch_is_retried_next_poll() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "cepelinai.jpg");

        let ingestor = Arc::new(FakeIngestor::failing("cepelinai.jpg"));
        let mut watcher = Watcher::new(
            dir.path().to_path_buf(),
            Duration::from_secs(2),
            ingestor.clone(),
        );

        assert_eq!(watcher.poll_once().await.unwrap(), 1);
        watcher.drain().await;
        assert_eq!(watcher.poll_once().await.unwrap(), 1);
        watcher.drain().await;

        assert_eq!(ingestor.calls().len(), 2);
        assert_eq!(watcher.summary().failed, 2);
        assert_eq!(watcher.summary().succeeded, 0);
    }

    #[tokio::test]
    async fn test_only_image_extensions_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "morku-sriuba.JPG");
        touch(dir.path(), "tinginys.webp");
        std::fs::create_dir(dir.path().join("subdir.jpg")).unwrap();

        let ingestor = Arc::new(FakeIngestor::new());
        let mut watcher = Watcher::new(
            dir.path().to_path_buf(),
            Duration::from_secs(2),
            ingestor.clone(),
        );

        assert_eq!(watcher.poll_once().await.unwrap(), 2);
        watcher.drain().await;

        let mut calls = ingestor.calls();
        calls.sort();
        assert_eq!(calls, vec!["morku-sriuba.JPG", "tinginys.webp"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_polls_and_drains() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "saltibarsciai.jpg");

        let ingestor = Arc::new(FakeIngestor::new());
        let watcher = Watcher::new(
            dir.path().to_path_buf(),
            Duration::from_millis(100),
            ingestor.clone(),
        );

        let summary = watcher
            .run_until(tokio::time::sleep(Duration::from_millis(350)))
            .await;

        assert_eq!(summary.dispatched, 1);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(ingestor.calls(), vec!["saltibarsciai.jpg"]);
    }
}
