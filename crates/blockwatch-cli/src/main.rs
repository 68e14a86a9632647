use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use blockwatch_client::{ProbeConfig, ProxyConfig, ReqwestProber};
use blockwatch_core::report::{ScanEvent, ScanReporter, TracingScanReporter};
use blockwatch_core::{ProgressSnapshot, ScanConfig, ScanSummary, Scanner, load_domains_from_path};
use blockwatch_store::{CsvResultSink, FsEvidenceStore};

#[derive(Parser)]
#[command(
    name = "blockwatch",
    version,
    about = "Detect ISP block-notice pages through a residential proxy"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every domain in a list and write verdicts to CSV
    Run {
        /// Plain-text file with one domain per line
        domain_file: PathBuf,

        /// CSV file for results
        output_file: PathBuf,

        /// ISP name written to the results and evidence file names
        #[arg(long, env = "ISP_LABEL", default_value = "ES_DigiSpain")]
        isp_label: String,

        /// Directory for captured block pages
        #[arg(long, env = "EVIDENCE_DIR", default_value = "html_content")]
        evidence_dir: PathBuf,

        /// Maximum domains probed at once
        #[arg(short, long, default_value_t = 500)]
        concurrency: usize,

        /// Per-attempt timeout in seconds
        #[arg(long, default_value_t = 3)]
        timeout_secs: u64,

        /// Write "Inconclusive" for domains that never answered
        #[arg(long, default_value_t = false)]
        report_inconclusive: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("blockwatch=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            domain_file,
            output_file,
            isp_label,
            evidence_dir,
            concurrency,
            timeout_secs,
            report_inconclusive,
        } => {
            let config = ScanConfig::default()
                .with_concurrency(concurrency)
                .with_isp_label(isp_label);
            let probe_config =
                ProbeConfig::default().with_timeout(Duration::from_secs(timeout_secs));
            cmd_run(
                &domain_file,
                &output_file,
                &evidence_dir,
                config,
                &probe_config,
                report_inconclusive,
            )
            .await?;
        }
    }

    Ok(())
}

async fn cmd_run(
    domain_file: &Path,
    output_file: &Path,
    evidence_dir: &Path,
    config: ScanConfig,
    probe_config: &ProbeConfig,
    report_inconclusive: bool,
) -> Result<()> {
    // 1. Load domains
    let domains = load_domains_from_path(domain_file).context("Failed to load domain list")?;
    println!("Loaded {} unique domains", domains.len());

    // 2. Build the prober
    let proxy = ProxyConfig::from_env().context("Invalid proxy configuration")?;
    let prober =
        ReqwestProber::new(probe_config, proxy.as_ref()).context("Failed to create HTTP client")?;

    // 3. Open outputs
    let sink = CsvResultSink::create(output_file)
        .context("Failed to create results file")?
        .with_inconclusive(report_inconclusive);
    let evidence = FsEvidenceStore::new(evidence_dir);

    // 4. Scan
    let isp_label = config.isp_label.clone();
    let scanner = Scanner::new(prober, evidence, sink, config).context("Invalid scan settings")?;

    println!(
        "Starting scan of {} domains across 1 ISP ({}, {} total checks)",
        domains.len(),
        isp_label,
        domains.len()
    );

    let reporter = Arc::new(ConsoleReporter::new(domains.len() as u64)?);
    let result = scanner.run(domains, Arc::clone(&reporter)).await;
    if result.is_err() {
        reporter.bar.abandon();
    }
    let summary = result.context("Scan aborted")?;

    print_summary(&summary, output_file, evidence_dir, report_inconclusive);
    Ok(())
}

const PROGRESS_TEMPLATE: &str = "[{bar:40}] {percent}% | {pos}/{len} | {msg}";

/// Draws the scan progress bar on stderr and logs everything else.
struct ConsoleReporter {
    bar: ProgressBar,
}

impl ConsoleReporter {
    fn new(total: u64) -> Result<Self> {
        Self::with_bar(ProgressBar::new(total))
    }

    fn with_bar(bar: ProgressBar) -> Result<Self> {
        bar.set_style(
            ProgressStyle::with_template(PROGRESS_TEMPLATE)
                .context("Invalid progress bar template")?
                .progress_chars("█░"),
        );
        Ok(Self { bar })
    }
}

impl ScanReporter for ConsoleReporter {
    fn report(&self, event: ScanEvent<'_>) {
        match event {
            ScanEvent::Progress { snapshot } => {
                self.bar.set_position(snapshot.completed);
                self.bar.set_message(progress_message(snapshot));
            }
            ScanEvent::Finished { summary } => {
                self.bar.set_position(summary.completed);
                self.bar.finish();
                TracingScanReporter.report(event);
            }
            // Per-attempt chatter is debug/trace level; only lines that can
            // reach the default filter pay for clearing the bar.
            ScanEvent::Started { .. }
            | ScanEvent::BlockDetected { .. }
            | ScanEvent::EvidenceFailed { .. }
            | ScanEvent::PipelinePanicked { .. } => {
                self.bar.suspend(|| TracingScanReporter.report(event));
            }
            other => TracingScanReporter.report(other),
        }
    }
}

fn progress_message(snapshot: &ProgressSnapshot) -> String {
    format!(
        "Blocks: {} | {:.0}/sec | ETA: {:.1}m",
        snapshot.blocked,
        snapshot.rate(),
        snapshot.eta().as_secs_f64() / 60.0,
    )
}

fn print_summary(
    summary: &ScanSummary,
    output_file: &Path,
    evidence_dir: &Path,
    report_inconclusive: bool,
) {
    let rule = "=".repeat(50);
    println!("\n\n{rule}");
    println!(
        "SCAN COMPLETE - Total time: {:.1} seconds",
        summary.elapsed.as_secs_f64()
    );
    println!("Results saved to: {}", output_file.display());
    println!(
        "Scanned {} domains with {} checks",
        summary.total, summary.completed
    );
    println!("Average speed: {:.1} checks/sec", summary.average_rate());
    println!("Blocks found: {}", summary.blocked);
    if report_inconclusive {
        println!("Inconclusive (no response): {}", summary.inconclusive);
    }
    if summary.blocked > 0 {
        let dir = std::path::absolute(evidence_dir).unwrap_or_else(|_| evidence_dir.to_path_buf());
        println!("HTML content saved to: {}", dir.display());
    }
    println!("{rule}");
}
