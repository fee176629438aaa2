// runner.rs
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use takeover_common::Settings;
use takeover_fingerprint::FingerprintStore;
use takeover_orchestrator::{Detector, Orchestrator};
use takeover_probe::HttpProber;
use takeover_sync::{SyncConfig, Synchronizer};

use crate::output::{print_integrity, print_results};

pub struct ScanArgs {
    pub targets: Option<String>,
    pub list: Option<PathBuf>,
    pub https: bool,
    pub concurrency: usize,
    pub timeout: u64,
    pub deadline: Option<u64>,
    pub update: bool,
    pub fingerprints: Option<PathBuf>,
    pub vuln_only: bool,
    pub output_format: String,
}

pub async fn run_scan(args: ScanArgs) -> Result<()> {
    let candidates = load_candidates(args.targets.as_deref(), args.list.as_deref()).await?;

    // Synchronization always finishes before the store is loaded.
    let path = match args.fingerprints {
        Some(path) => path,
        None => {
            let sync = Synchronizer::new(SyncConfig::from_env())?;
            let path = sync.local_path()?;
            if args.update || !path.exists() {
                info!("Downloading fingerprints to {}", path.display());
                sync.download()
                    .await
                    .context("Failed to download fingerprints")?;
            }
            path
        }
    };
    let store = FingerprintStore::load(&path)
        .await
        .with_context(|| format!("Failed to load fingerprints from {}", path.display()))?;
    if store.is_empty() {
        warn!("Fingerprint database is empty, nothing can be reported as vulnerable");
    }

    let settings = Settings::default()
        .with_https(args.https)
        .with_concurrency(args.concurrency)
        .with_timeout(Duration::from_secs(args.timeout));
    info!("Candidates: {}", candidates.len());
    info!("Concurrency: {}", settings.concurrency);
    info!("Timeout: {:?}", settings.timeout);

    let prober = HttpProber::new(settings.timeout)?;
    let mut orchestrator = Orchestrator::new(Detector::new(Arc::new(prober), store, settings));
    if let Some(secs) = args.deadline {
        orchestrator = orchestrator.with_deadline(Duration::from_secs(secs));
    }

    let handle = orchestrator.cancel_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling scan");
            handle.cancel();
        }
    });

    let verdicts = orchestrator.scan(candidates).await;
    interrupt.abort();

    let stats = orchestrator.stats().await;
    print_results(&verdicts, &stats, &args.output_format, args.vuln_only)?;
    Ok(())
}

pub async fn run_update() -> Result<()> {
    let sync = Synchronizer::new(SyncConfig::from_env())?;
    let report = sync.download().await.context("Failed to download fingerprints")?;
    println!(
        "Installed {} fingerprints ({} bytes) at {}",
        report.fingerprints,
        report.bytes,
        report.path.display()
    );
    Ok(())
}

pub async fn run_check() -> Result<()> {
    let sync = Synchronizer::new(SyncConfig::from_env())?;
    let result = sync
        .check_integrity()
        .await
        .context("Failed to check fingerprint integrity")?;
    print_integrity(&result);
    Ok(())
}

/// Gather candidates from `-t`, a list file, or stdin, in that order of preference.
async fn load_candidates(targets: Option<&str>, list: Option<&Path>) -> Result<Vec<String>> {
    let candidates = if let Some(targets) = targets {
        parse_candidates(&targets.replace(',', "\n"))
    } else if let Some(list) = list {
        let text = tokio::fs::read_to_string(list)
            .await
            .with_context(|| format!("Failed to read candidate list {}", list.display()))?;
        parse_candidates(&text)
    } else {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read candidates from stdin")?;
        parse_candidates(&text)
    };

    if candidates.is_empty() {
        bail!("No candidates specified");
    }
    Ok(candidates)
}

/// One candidate per line; blank lines and `#` comments are skipped.
fn parse_candidates(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
