use std::time::Duration;

use anyhow::{anyhow, Context};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::NilccReport;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of comparing a served report against an expected measurement.
///
/// Either the comparison ran (`error` is `None`, `verified` says whether it
/// matched) or it could not run (`error` is set, `verified` is false and
/// `measurement` is empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub verified: bool,
    pub measurement: String,
    pub expected_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationResult {
    /// Exact, case-sensitive comparison. Hex digests differing only in case
    /// do not match.
    pub fn compare(report: &NilccReport, expected_hash: &str) -> Self {
        Self {
            verified: report.measurement() == expected_hash,
            measurement: report.measurement().to_string(),
            expected_hash: expected_hash.to_string(),
            version: Some(report.nilcc_version().to_string()),
            error: None,
        }
    }

    pub fn failure(expected_hash: &str, error: impl Into<String>) -> Self {
        Self {
            verified: false,
            measurement: String::new(),
            expected_hash: expected_hash.to_string(),
            version: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_FETCH_TIMEOUT),
        }
    }
}

/// Fetches attestation reports over HTTP. One GET per call, no retries and
/// no caching; dropping the returned future aborts the request.
#[derive(Debug, Clone)]
pub struct ReportFetcher {
    client: Client,
}

impl ReportFetcher {
    pub fn new(config: FetcherConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build http client")?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, report_url: &str) -> anyhow::Result<NilccReport> {
        let url = Url::parse(report_url)
            .with_context(|| format!("invalid report url {:?}", report_url))?;

        tracing::debug!("fetching attestation report from {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to request report from {}", report_url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Failed to fetch report: {}", status));
        }

        let body = response
            .bytes()
            .await
            .context("failed to read report body")?;
        NilccReport::parse(&body)
    }

    /// Fetches the report and compares its measurement with `expected_hash`.
    /// Failures are reported through [`VerificationResult::error`].
    pub async fn verify(&self, report_url: &str, expected_hash: &str) -> VerificationResult {
        match self.fetch(report_url).await {
            Ok(report) => {
                let result = VerificationResult::compare(&report, expected_hash);
                if result.verified {
                    tracing::info!(
                        "measurement {} matches (nilcc {})",
                        result.measurement,
                        report.nilcc_version()
                    );
                } else {
                    tracing::warn!(
                        "measurement mismatch: report has {}, expected {}",
                        result.measurement,
                        expected_hash
                    );
                }
                result
            }
            Err(err) => {
                let message = format!("{:#}", err);
                tracing::warn!("attestation verification failed: {}", message);
                VerificationResult::failure(expected_hash, message)
            }
        }
    }
}

/// Verifies `report_url` against `expected_hash` with a default fetcher.
pub async fn verify_attestation(report_url: &str, expected_hash: &str) -> VerificationResult {
    match ReportFetcher::new(FetcherConfig::default()) {
        Ok(fetcher) => fetcher.verify(report_url, expected_hash).await,
        Err(err) => VerificationResult::failure(expected_hash, format!("{:#}", err)),
    }
}
