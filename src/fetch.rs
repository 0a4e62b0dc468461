//! Batched concurrent content retrieval.
//!
//! Paths are split into fixed-size batches. Inside a batch every read is
//! issued at once; the next batch starts only after all reads of the current
//! one have settled. Each read produces its own [`FetchOutcome`], so one
//! failure never aborts its batch or the run.

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use tracing::{info, warn};

use crate::models::RetainedFile;

/// Reads one file's content from a source.
///
/// `Ok(None)` means the path resolved to nothing decodable (a submodule,
/// a symlink, an empty blob). Errors are per-file and are never propagated
/// past [`fetch_in_batches`].
#[async_trait]
pub trait FileReader: Send + Sync {
    async fn read_file(&self, path: &str) -> Result<Option<RetainedFile>>;
}

/// Result of reading a single path.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Retained(RetainedFile),
    Empty { path: String },
    Failed { path: String, reason: String },
}

impl FetchOutcome {
    pub fn path(&self) -> &str {
        match self {
            FetchOutcome::Retained(file) => &file.path,
            FetchOutcome::Empty { path } | FetchOutcome::Failed { path, .. } => path,
        }
    }
}

/// Every outcome of a batched fetch, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub outcomes: Vec<FetchOutcome>,
    /// Number of sequential batch phases run.
    pub batches: usize,
}

impl FetchReport {
    pub fn retained_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FetchOutcome::Retained(_)))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FetchOutcome::Failed { .. }))
            .count()
    }

    pub fn empty_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FetchOutcome::Empty { .. }))
            .count()
    }

    /// Keeps only the successfully read files.
    pub fn into_retained(self) -> Vec<RetainedFile> {
        self.outcomes
            .into_iter()
            .filter_map(|o| match o {
                FetchOutcome::Retained(file) => Some(file),
                _ => None,
            })
            .collect()
    }
}

/// Reads `paths` through `reader` in batches of `batch_size`.
///
/// A `batch_size` of zero is treated as one.
pub async fn fetch_in_batches<R>(reader: &R, paths: &[String], batch_size: usize) -> FetchReport
where
    R: FileReader + ?Sized,
{
    let batch_size = batch_size.max(1);
    let mut report = FetchReport::default();

    for batch in paths.chunks(batch_size) {
        let reads = batch.iter().map(|path| async move {
            match reader.read_file(path).await {
                Ok(Some(file)) => FetchOutcome::Retained(file),
                Ok(None) => FetchOutcome::Empty { path: path.clone() },
                Err(e) => FetchOutcome::Failed {
                    path: path.clone(),
                    reason: e.to_string(),
                },
            }
        });

        let outcomes = join_all(reads).await;
        for outcome in &outcomes {
            if let FetchOutcome::Failed { reason, .. } = outcome {
                warn!(path = outcome.path(), reason = %reason, "dropping failed download");
            }
        }
        report.outcomes.extend(outcomes);
        report.batches += 1;

        info!(
            batch = report.batches,
            retained = report.retained_count(),
            total = paths.len(),
            "downloaded batch"
        );
    }

    let failed = report.failed_count();
    let empty = report.empty_count();
    if failed > 0 || empty > 0 {
        info!(failed, empty, "some files were dropped during fetch");
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Fake reader that records how many reads overlap and fails chosen paths.
    struct FakeReader {
        fail: HashSet<String>,
        empty: HashSet<String>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        started: Mutex<Vec<String>>,
    }

    impl FakeReader {
        fn new(fail: &[&str], empty: &[&str]) -> Self {
            Self {
                fail: fail.iter().map(|s| s.to_string()).collect(),
                empty: empty.iter().map(|s| s.to_string()).collect(),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                started: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FileReader for FakeReader {
        async fn read_file(&self, path: &str) -> Result<Option<RetainedFile>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.started.lock().unwrap().push(path.to_string());

            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail.contains(path) {
                anyhow::bail!("injected failure for {}", path);
            }
            if self.empty.contains(path) {
                return Ok(None);
            }
            let content = format!("content of {}", path);
            let size = content.len() as u64;
            Ok(Some(RetainedFile::new(path, content, size, 200)))
        }
    }

    fn paths(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("src/file{}.rs", i)).collect()
    }

    #[tokio::test]
    async fn runs_ceil_n_over_b_batches() {
        let reader = FakeReader::new(&[], &[]);
        let report = fetch_in_batches(&reader, &paths(25), 10).await;
        assert_eq!(report.batches, 3);
        assert_eq!(report.retained_count(), 25);

        let report = fetch_in_batches(&reader, &paths(20), 10).await;
        assert_eq!(report.batches, 2);
    }

    #[tokio::test]
    async fn in_flight_reads_bounded_by_batch_size() {
        let reader = FakeReader::new(&[], &[]);
        fetch_in_batches(&reader, &paths(23), 5).await;
        let max = reader.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 5, "max in flight was {}", max);
        assert!(max > 1, "reads within a batch should overlap");
    }

    #[tokio::test]
    async fn failure_does_not_abort_batch() {
        let all = paths(10);
        let reader = FakeReader::new(&["src/file3.rs"], &["src/file7.rs"]);
        let report = fetch_in_batches(&reader, &all, 10).await;

        assert_eq!(report.outcomes.len(), 10);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.empty_count(), 1);
        assert_eq!(reader.started.lock().unwrap().len(), 10);

        let retained = report.into_retained();
        assert_eq!(retained.len(), 8);
        assert!(retained.iter().all(|f| f.path != "src/file3.rs"));
    }

    #[tokio::test]
    async fn outcomes_keep_discovery_order() {
        let all = paths(12);
        let reader = FakeReader::new(&["src/file0.rs"], &[]);
        let report = fetch_in_batches(&reader, &all, 4).await;
        let order: Vec<&str> = report.outcomes.iter().map(|o| o.path()).collect();
        let expected: Vec<&str> = all.iter().map(String::as_str).collect();
        assert_eq!(order, expected);
    }

    #[tokio::test]
    async fn empty_input_runs_no_batches() {
        let reader = FakeReader::new(&[], &[]);
        let report = fetch_in_batches(&reader, &[], 100).await;
        assert_eq!(report.batches, 0);
        assert!(report.outcomes.is_empty());
    }

    #[tokio::test]
    async fn zero_batch_size_is_clamped() {
        let reader = FakeReader::new(&[], &[]);
        let report = fetch_in_batches(&reader, &paths(3), 0).await;
        assert_eq!(report.batches, 3);
    }
}
