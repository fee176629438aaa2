//! Output formatting for verdicts

use anyhow::Result;
use serde_json::json;
use std::time::Duration;
use takeover_common::{IntegrityResult, ScanStats, Status, Verdict};

/// Print verdicts in input order in the specified format
pub fn print_results(
    verdicts: &[Verdict],
    stats: &ScanStats,
    format: &str,
    vuln_only: bool,
) -> Result<()> {
    let shown: Vec<&Verdict> = verdicts
        .iter()
        .filter(|v| !vuln_only || v.is_vulnerable())
        .collect();

    match format.trim().to_lowercase().as_str() {
        "json" | "j" => print_json(&shown, stats)?,
        _ => print_table(&shown, stats),
    }
    Ok(())
}

fn print_table(verdicts: &[&Verdict], stats: &ScanStats) {
    if verdicts.is_empty() {
        println!("\nNo results to display.\n");
    } else {
        println!("\n{:-<80}", "");
        println!("{:<40} {:<16} {:<22}", "CANDIDATE", "STATUS", "SERVICE/DETAIL");
        println!("{:-<80}", "");
        for verdict in verdicts {
            println!("{}", format_row(verdict));
        }
        println!("{:-<80}", "");
    }

    println!("\nSummary:");
    println!("  Total scanned: {}", stats.scanned);
    println!("  Vulnerable: {}", stats.vulnerable);
    println!("  Not vulnerable: {}", stats.not_vulnerable);
    println!("  Errors: {}", stats.errors());
    println!("  Scan duration: {}", format_duration(stats.elapsed));
    println!();
}

fn print_json(verdicts: &[&Verdict], stats: &ScanStats) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&render_json(verdicts, stats))?);
    Ok(())
}

fn render_json(verdicts: &[&Verdict], stats: &ScanStats) -> serde_json::Value {
    json!({
        "scan_info": {
            "duration_seconds": stats.elapsed.as_secs_f64(),
            "duration_formatted": format_duration(stats.elapsed),
            "total_scanned": stats.scanned,
            "vulnerable": stats.vulnerable,
            "errors": stats.errors(),
        },
        "results": verdicts,
    })
}

fn format_row(verdict: &Verdict) -> String {
    let info = match verdict.status() {
        Status::Vulnerable => verdict
            .matched()
            .map(|fp| fp.service.clone())
            .unwrap_or_default(),
        Status::NotVulnerable => String::new(),
        Status::Error(_) => verdict.detail().unwrap_or("").to_string(),
    };
    format!(
        "{:<40} {:<16} {}",
        truncate(verdict.candidate(), 40),
        verdict.status().to_string(),
        truncate(&info, 60)
    )
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

pub fn print_integrity(result: &IntegrityResult) {
    if result.up_to_date {
        println!("Fingerprints are up to date ({})", result.local_digest);
    } else {
        println!("Fingerprints are outdated or modified");
        println!("  local:  {}", result.local_digest);
        println!("  remote: {}", result.remote_digest);
        println!("Run `takeover update` to install the latest version.");
    }
}

/// Seconds with two decimals below a minute, then `1m05s` / `1h02m`.
fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    match secs {
        0..=59 => format!("{:.2}s", elapsed.as_secs_f64()),
        60..=3599 => format!("{}m{:02}s", secs / 60, secs % 60),
        _ => format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60),
    }
}
