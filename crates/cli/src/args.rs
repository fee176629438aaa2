use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "takeover")]
#[command(version)]
#[command(about = "Detect subdomain takeover exposure from HTTP responses", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe candidates and match their responses against the fingerprints
    Scan {
        /// Comma-separated candidates. Example: a.example.com,https://b.example.com
        #[arg(short = 't', long, conflicts_with = "list")]
        targets: Option<String>,

        /// File with one candidate per line (stdin when neither -t nor -l is given)
        #[arg(short = 'l', long)]
        list: Option<PathBuf>,

        /// Use https:// for candidates without a scheme
        #[arg(long)]
        https: bool,

        /// Max concurrent probes
        #[arg(short, long, default_value = "10")]
        concurrency: usize,

        /// Per-probe timeout in seconds
        #[arg(long, default_value = "10")]
        timeout: u64,

        /// Cancel the whole scan after this many seconds
        #[arg(long)]
        deadline: Option<u64>,

        /// Download the latest fingerprints before scanning
        #[arg(long)]
        update: bool,

        /// Fingerprint file to use instead of the synchronized one
        #[arg(long)]
        fingerprints: Option<PathBuf>,

        /// Only print vulnerable candidates
        #[arg(long)]
        vuln_only: bool,

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        output_format: String,
    },

    /// Download the latest fingerprint document
    Update,

    /// Compare the local fingerprint document with the remote one
    Check,
}
