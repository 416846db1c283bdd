//! Email classification benchmark - summarizes classifier logs into benchmark.md.
//!
//! Usage:
//!   email-benchmark              # reads test_<category>_<model>.log from the current directory
//!   email-benchmark ./logs
//!   RUST_LOG=debug email-benchmark ./logs

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::Result;
use clap::Parser;

use bench_core::report::print_summary;
use bench_core::scan::{BenchmarkConfig, ScanProgress, run_benchmark};

#[derive(Parser)]
#[command(name = "email-benchmark")]
#[command(about = "Summarize email classification logs into a Markdown benchmark table")]
struct Cli {
    /// Directory containing test_<category>_<model>.log files
    #[arg(default_value = ".")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = BenchmarkConfig::new(cli.log_dir);

    eprintln!("[*] Reading logs from {}...", config.log_dir.display());
    let progress = ScanProgress::new();
    let results = run_benchmark(&config, &progress)?;

    eprintln!(
        "[*] Parsed {} log files ({} records, {} undecodable lines)",
        progress.parsed_files.load(Ordering::Relaxed),
        progress.records.load(Ordering::Relaxed),
        progress.decode_errors.load(Ordering::Relaxed)
    );
    if results.is_empty() {
        log::warn!("No test_*_*.log files found in {}", config.log_dir.display());
    }

    print_summary(&results.safe, &results.malicious);
    println!(
        "✅ Benchmark results saved to {}",
        config.output_path.display()
    );

    Ok(())
}
