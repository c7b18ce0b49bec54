use clap::{Args, Subcommand};

use crate::utils::{block_on, FetchArgs};

#[derive(Subcommand)]
pub enum DebugCli {
    Report(DebugReportCli),
}

impl DebugCli {
    pub fn run(&self) -> anyhow::Result<()> {
        match self {
            DebugCli::Report(cli) => cli.run(),
        }
    }
}

/// Fetches a report and logs what it says about the workload.
#[derive(Args)]
pub struct DebugReportCli {
    #[clap(flatten)]
    fetch: FetchArgs,
}

impl DebugReportCli {
    pub fn run(&self) -> anyhow::Result<()> {
        let fetcher = self.fetch.new_fetcher()?;
        let report = block_on(fetcher.fetch(&self.fetch.report_url))??;

        tracing::info!("Report:");
        tracing::info!("\tMeasurement: {}", report.measurement());
        for (key, value) in &report.report.extra {
            if value.is_object() {
                continue;
            }
            tracing::info!("\t{}: {}", key, value);
        }
        tracing::info!("Environment:");
        tracing::info!("\tnilCC version: {}", report.nilcc_version());
        match report.vm_type() {
            Some(vm_type) => tracing::info!("\tVM type: {}", vm_type),
            None => tracing::info!("\tVM type: unknown"),
        }
        if let Some(cpus) = report.cpu_count() {
            tracing::info!("\tCPUs: {}", cpus);
        }
        if let Some(token) = report.gpu_token() {
            tracing::info!("\tGPU token: {} chars", token.chars().count());
        }
        Ok(())
    }
}
