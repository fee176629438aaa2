mod args;
mod output;
mod runner;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use args::{Cli, Commands};
use runner::{run_check, run_scan, run_update, ScanArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Scan {
            targets,
            list,
            https,
            concurrency,
            timeout,
            deadline,
            update,
            fingerprints,
            vuln_only,
            output_format,
        } => {
            run_scan(ScanArgs {
                targets,
                list,
                https,
                concurrency,
                timeout,
                deadline,
                update,
                fingerprints,
                vuln_only,
                output_format,
            })
            .await?;
        }
        Commands::Update => run_update().await?,
        Commands::Check => run_check().await?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
