//! Compares a workload's live attestation report against an expected
//! measurement hash.

use std::path::PathBuf;

use anyhow::anyhow;
use clap::Args;
use nilcc_attestation_verifier::VerificationResult;

use crate::utils::{block_on, emit_json, FetchArgs};

#[derive(Args)]
pub struct VerifyCli {
    #[clap(flatten)]
    fetch: FetchArgs,

    /// Expected measurement hash, compared byte-for-byte (case-sensitive)
    #[arg(long, env = "NILCC_EXPECTED_HASH")]
    expected_hash: String,

    /// Also write the JSON result to this file
    #[arg(long)]
    out: Option<PathBuf>,
}

impl VerifyCli {
    pub fn run(&self) -> anyhow::Result<()> {
        let fetcher = self.fetch.new_fetcher()?;
        let result = block_on(fetcher.verify(&self.fetch.report_url, &self.expected_hash))?;

        emit_json(&result, self.out.as_ref())?;
        check_result(&result)
    }
}

/// Only a completed comparison that matched counts as success.
fn check_result(result: &VerificationResult) -> anyhow::Result<()> {
    match (&result.error, result.verified) {
        (Some(err), _) => Err(anyhow!("could not verify attestation: {}", err)),
        (None, false) => Err(anyhow!(
            "measurement mismatch: report has {}, expected {}",
            result.measurement,
            result.expected_hash
        )),
        (None, true) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Server, ServerGuard};

    const REPORT: &str = r#"{"report":{"measurement":"abc123"},"environment":{"nilcc_version":"0.2.1"}}"#;

    fn serve(server: &mut ServerGuard, status: usize, body: &str) -> mockito::Mock {
        server
            .mock("GET", "/report")
            .with_status(status)
            .with_body(body)
            .create()
    }

    fn verify_cli(server: &ServerGuard, expected_hash: &str, out: Option<PathBuf>) -> VerifyCli {
        VerifyCli {
            fetch: FetchArgs {
                report_url: format!("{}/report", server.url()),
                timeout_secs: 5,
            },
            expected_hash: expected_hash.to_string(),
            out,
        }
    }

    #[test]
    fn test_match_succeeds() {
        let mut server = Server::new();
        let _m = serve(&mut server, 200, REPORT);
        assert!(verify_cli(&server, "abc123", None).run().is_ok());
    }

    #[test]
    fn test_mismatch_fails() {
        let mut server = Server::new();
        let _m = serve(&mut server, 200, REPORT);
        let err = verify_cli(&server, "ABC123", None).run().unwrap_err();
        assert!(err.to_string().contains("measurement mismatch"));
    }

    #[test]
    fn test_server_error_fails() {
        let mut server = Server::new();
        let _m = serve(&mut server, 500, "oops");
        let err = verify_cli(&server, "abc123", None).run().unwrap_err();
        assert!(err.to_string().contains("could not verify attestation"));
    }

    #[test]
    fn test_writes_result_file() {
        let mut server = Server::new();
        let _m = serve(&mut server, 200, REPORT);
        let out = std::env::temp_dir().join(format!("nilcc-verify-{}.json", std::process::id()));

        assert!(verify_cli(&server, "other", Some(out.clone())).run().is_err());
        let written: VerificationResult =
            serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
        std::fs::remove_file(&out).unwrap();

        assert!(!written.verified);
        assert_eq!(written.measurement, "abc123");
        assert_eq!(written.expected_hash, "other");
        assert_eq!(written.version.as_deref(), Some("0.2.1"));
        assert!(written.error.is_none());
    }

    #[test]
    fn test_check_result() {
        let matched = VerificationResult {
            verified: true,
            measurement: "aa".into(),
            expected_hash: "aa".into(),
            version: Some("0.2.1".into()),
            error: None,
        };
        assert!(check_result(&matched).is_ok());
        assert!(check_result(&VerificationResult {
            verified: false,
            ..matched.clone()
        })
        .is_err());
        assert!(check_result(&VerificationResult::failure("aa", "boom")).is_err());
    }
}
