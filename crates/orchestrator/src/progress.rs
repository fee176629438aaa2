//! Progress tracking

use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

use takeover_common::{ScanStats, Verdict};

pub struct ProgressTracker {
    stats: Mutex<ScanStats>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            stats: Mutex::new(ScanStats::default()),
        }
    }

    pub async fn reset(&self, total: usize) {
        *self.stats.lock().await = ScanStats::new(total);
    }

    pub async fn record(&self, verdict: &Verdict) {
        self.stats.lock().await.update(verdict);
    }

    pub async fn finish(&self, elapsed: Duration) {
        self.stats.lock().await.elapsed = elapsed;
    }

    pub async fn snapshot(&self) -> ScanStats {
        self.stats.lock().await.clone()
    }

    pub async fn log_summary(&self) {
        let stats = self.snapshot().await;

        info!("Scan Summary:");
        info!("  Total targets: {}", stats.total_targets);
        info!("  Vulnerable: {}", stats.vulnerable);
        info!("  Not vulnerable: {}", stats.not_vulnerable);
        info!(
            "  Errors: {} (network {}, timeout {}, cancelled {})",
            stats.errors(),
            stats.network_errors,
            stats.timeouts,
            stats.cancelled
        );
        info!("  Rate: {:.1} targets/s", stats.rate());
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
