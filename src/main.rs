use anyhow::Result;
use clap::Parser;
use crossterm::style::Stylize;
use ss_probe::{
    FetchResult, FetcherConfig, Pipeline, PipelineConfig, ProbeObserver, ProbeReport,
    ProxyCandidate, VerificationOutcome, VerificationStatus, VerifierConfig,
    DEFAULT_VERIFIER_ENDPOINT,
};
use std::io::{self, Write};
use std::time::Duration;

/// Check if a proxy list has shadowsocks proxies
#[derive(Parser)]
#[command(name = "ss-probe")]
#[command(about = "Check if a proxy list has shadowsocks proxies and which of them are live")]
struct Cli {
    /// URL of the proxy list (plain text or base64)
    url: String,

    /// Verify every proxy found against the verification service
    #[arg(short, long)]
    verify: bool,

    /// Base URL of the verification service
    #[arg(long, default_value = DEFAULT_VERIFIER_ENDPOINT)]
    verifier: String,

    /// Ring the terminal bell when the first active proxy is found
    #[arg(short, long)]
    bell: bool,

    /// Timeout in seconds for each verification call
    #[arg(long, default_value = "10")]
    timeout: u64,

    /// Timeout in seconds for fetching the list
    #[arg(long, default_value = "30")]
    fetch_timeout: u64,

    /// Pause in milliseconds between verification calls
    #[arg(long, default_value = "200")]
    delay: u64,

    /// Print every shadowsocks entry found
    #[arg(short, long)]
    list: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Prints progress to the terminal
struct ConsoleObserver {
    bell: bool,
    list: bool,
}

impl ProbeObserver for ConsoleObserver {
    fn on_fetched(&self, result: &FetchResult) {
        println!("Fetched {} bytes", result.body.len());
    }

    fn on_base64(&self) {
        println!("{}", "The list appears to be base64 encoded. Decoding...".yellow());
    }

    fn on_candidates(&self, candidates: &[ProxyCandidate]) {
        if candidates.is_empty() {
            println!("{}", "No shadowsocks proxies found".red());
            return;
        }

        println!(
            "{}",
            format!("Found {} shadowsocks proxies", candidates.len()).green()
        );
        if self.list {
            for candidate in candidates {
                println!("  {}", candidate);
            }
        }
    }

    fn on_outcome(&self, index: usize, total: usize, outcome: &VerificationOutcome) {
        let progress = format!("[{}/{}]", index + 1, total);
        match &outcome.status {
            VerificationStatus::Active(ip) => {
                println!("{} {} {} ({})", progress, "active".green(), outcome.candidate, ip)
            }
            VerificationStatus::Inactive(reason) => {
                println!("{} {} {} ({})", progress, "inactive".red(), outcome.candidate, reason)
            }
            VerificationStatus::Unreachable(reason) => {
                println!("{} {} {} ({})", progress, "unreachable".red(), outcome.candidate, reason)
            }
            VerificationStatus::Timeout => {
                println!("{} {} {}", progress, "timeout".red(), outcome.candidate)
            }
        }
    }

    fn on_first_active(&self, _outcome: &VerificationOutcome) {
        if self.bell {
            print!("\x07");
            let _ = io::stdout().flush();
        }
    }
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_summary(report: &ProbeReport) {
    let Some(active_count) = report.active_count() else {
        return;
    };

    let active = report.active();
    if !active.is_empty() {
        println!("\nActive proxies:");
        for outcome in &active {
            match (outcome.observed_ip(), outcome.response_time_ms) {
                (Some(ip), Some(time)) => println!("  {} via {} ({}ms)", outcome.candidate, ip, time),
                _ => println!("  {}", outcome.candidate),
            }
        }
    }

    if report.verifier_unreachable() {
        println!(
            "{}",
            "The verification service could not be reached; check --verifier".red()
        );
    }

    let line = format!("{} of {} proxies are active", active_count, report.found());
    if active_count > 0 {
        println!("{}", line.green());
    } else {
        println!("{}", line.yellow());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut config = PipelineConfig::new().with_fetcher(
        FetcherConfig::new().with_timeout(Duration::from_secs(cli.fetch_timeout)),
    );
    if cli.verify {
        config = config.with_verification(
            VerifierConfig::new()
                .with_endpoint(cli.verifier.clone())
                .with_timeout(Duration::from_secs(cli.timeout))
                .with_settle_delay(Duration::from_millis(cli.delay)),
        );
        println!("Verifier: {}", cli.verifier);
    }

    let pipeline = Pipeline::new(config)?;
    let observer = ConsoleObserver {
        bell: cli.bell,
        list: cli.list,
    };

    let report = pipeline.run_with(&cli.url, &observer).await?;
    print_summary(&report);

    Ok(())
}
