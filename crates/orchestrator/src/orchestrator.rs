// crates/orchestrator/src/orchestrator.rs
//! Orchestrator - fans candidates out to a bounded worker pool

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use takeover_common::{ErrorKind, ScanStats, Verdict};

use crate::detector::Detector;
use crate::progress::ProgressTracker;

/// Stops the scan currently running on the orchestrator it came from.
#[derive(Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Orchestrator runs the detection engine over many candidates and returns
/// verdicts in input order.
pub struct Orchestrator {
    detector: Arc<Detector>,
    progress: Arc<ProgressTracker>,
    cancel: Arc<watch::Sender<bool>>,
    deadline: Option<Duration>,
}

impl Orchestrator {
    pub fn new(detector: Detector) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            detector: Arc::new(detector),
            progress: Arc::new(ProgressTracker::new()),
            cancel: Arc::new(tx),
            deadline: None,
        }
    }

    /// Cancel every scan that runs longer than `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: self.cancel.clone(),
        }
    }

    /// Statistics of the last (or current) scan.
    pub async fn stats(&self) -> ScanStats {
        self.progress.snapshot().await
    }

    /// Scan all candidates; exactly one verdict per candidate, in input order.
    ///
    /// A cancel issued before the scan starts cancels it immediately; the flag
    /// is cleared once the scan returns. After cancellation, in-flight and not
    /// yet started candidates get `Error(Cancelled)`.
    #[instrument(skip_all, fields(candidates = candidates.len()))]
    pub async fn scan(&self, candidates: Vec<String>) -> Vec<Verdict> {
        let scan_id = Uuid::new_v4();
        let total = candidates.len();
        let workers = self.detector.settings().workers_for(total);
        info!(%scan_id, total, workers, "Starting scan");

        self.progress.reset(total).await;
        let started = Instant::now();

        let names = candidates.clone();
        let queue: Arc<Mutex<VecDeque<(usize, String)>>> =
            Arc::new(Mutex::new(candidates.into_iter().enumerate().collect()));
        let slots: Arc<Mutex<Vec<Option<Verdict>>>> = Arc::new(Mutex::new(vec![None; total]));

        let deadline_task = self.deadline.map(|deadline| {
            let handle = self.cancel_handle();
            tokio::spawn(async move {
                tokio::time::sleep(deadline).await;
                warn!(?deadline, "Scan deadline reached, cancelling");
                handle.cancel();
            })
        });

        // Fixed pool of workers pulling (index, candidate) pairs from a shared queue.
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let queue = queue.clone();
            let slots = slots.clone();
            let detector = self.detector.clone();
            let progress = self.progress.clone();
            let mut cancel_rx = self.cancel.subscribe();

            let worker = tokio::spawn(async move {
                loop {
                    if *cancel_rx.borrow() {
                        break;
                    }

                    let next = queue.lock().await.pop_front();
                    let (index, candidate) = match next {
                        Some(item) => item,
                        None => break, // queue empty, exit worker
                    };

                    let outcome = tokio::select! {
                        biased;
                        _ = cancelled(&mut cancel_rx) => None,
                        verdict = detector.detect(&candidate) => Some(verdict),
                    };
                    let verdict = match outcome {
                        Some(verdict) => verdict,
                        None => Verdict::cancelled(candidate),
                    };

                    progress.record(&verdict).await;
                    slots.lock().await[index] = Some(verdict);
                }
            });
            handles.push(worker);
        }

        let mut failed_workers = 0;
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Scan worker failed");
                failed_workers += 1;
            }
        }
        if let Some(task) = deadline_task {
            task.abort();
            let _ = task.await;
        }
        let was_cancelled = *self.cancel.borrow();

        let filled = std::mem::take(&mut *slots.lock().await);
        let mut verdicts = Vec::with_capacity(total);
        for (index, (slot, name)) in filled.into_iter().zip(names).enumerate() {
            if let Some(verdict) = slot {
                verdicts.push(verdict);
                continue;
            }
            // A worker that panicked leaves its slots empty without any cancel.
            let verdict = if was_cancelled || failed_workers == 0 {
                Verdict::cancelled(name)
            } else {
                error!(index, candidate = %name, "No verdict, scan worker failed");
                Verdict::error(
                    name,
                    ErrorKind::Network,
                    Some("scan worker failed before producing a verdict".to_string()),
                )
            };
            self.progress.record(&verdict).await;
            verdicts.push(verdict);
        }

        self.cancel.send_replace(false);
        self.progress.finish(started.elapsed()).await;
        self.progress.log_summary().await;
        verdicts
    }
}

/// Resolves once the cancel flag is set; never resolves if the sender is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
