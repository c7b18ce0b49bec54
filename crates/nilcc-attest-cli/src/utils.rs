use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Args;
use nilcc_attestation_verifier::{FetcherConfig, ReportFetcher, DEFAULT_FETCH_TIMEOUT};
use serde::Serialize;
use tokio::runtime::Runtime;

#[derive(Args, Clone)]
pub struct FetchArgs {
    /// URL of the workload's attestation report
    #[arg(long, env = "NILCC_REPORT_URL")]
    pub report_url: String,

    /// Request timeout in seconds, 0 waits indefinitely
    #[arg(long, env = "NILCC_FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub timeout_secs: u64,
}

impl FetchArgs {
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            timeout: (self.timeout_secs > 0).then_some(Duration::from_secs(self.timeout_secs)),
        }
    }

    pub fn new_fetcher(&self) -> anyhow::Result<ReportFetcher> {
        ReportFetcher::new(self.fetcher_config())
    }
}

pub fn block_on<F: std::future::Future>(future: F) -> anyhow::Result<F::Output> {
    let rt = Runtime::new().context("failed to start tokio runtime")?;
    Ok(rt.block_on(future))
}

/// Prints `value` as pretty JSON on stdout and optionally writes it to `out`.
pub fn emit_json<T: Serialize>(value: &T, out: Option<&PathBuf>) -> anyhow::Result<()> {
    let encoded = serde_json::to_string_pretty(value)?;
    if let Some(out) = out {
        std::fs::write(out, &encoded)
            .with_context(|| format!("failed to write {}", out.display()))?;
    }
    println!("{}", encoded);
    Ok(())
}
