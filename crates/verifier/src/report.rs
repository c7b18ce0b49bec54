use std::{fmt, str::FromStr};

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attestation report as served by a nilCC workload.
///
/// Only `report.measurement` and `environment.nilcc_version` are required.
/// Everything else (TCB versions, signature, key digests, ...) is carried
/// untouched in the `extra` maps so a parsed report re-serializes to the
/// same document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NilccReport {
    pub report: ReportBody,
    pub environment: EnvironmentInfo,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportBody {
    pub measurement: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub nilcc_version: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NilccReport {
    pub fn parse(data: &[u8]) -> anyhow::Result<Self> {
        serde_json::from_slice(data).context("failed to parse attestation report")
    }

    pub fn measurement(&self) -> &str {
        &self.report.measurement
    }

    pub fn nilcc_version(&self) -> &str {
        &self.environment.nilcc_version
    }

    /// VM flavour the workload booted as, if the report states a known one.
    pub fn vm_type(&self) -> Option<VmType> {
        self.environment
            .extra
            .get("vm_type")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }

    pub fn cpu_count(&self) -> Option<u64> {
        self.environment.extra.get("cpu_count").and_then(Value::as_u64)
    }

    pub fn gpu_token(&self) -> Option<&str> {
        self.extra.get("gpu_token").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VmType {
    #[default]
    Cpu,
    Gpu,
}

impl VmType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VmType::Cpu => "cpu",
            VmType::Gpu => "gpu",
        }
    }
}

impl fmt::Display for VmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VmType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpu" => Ok(VmType::Cpu),
            "gpu" => Ok(VmType::Gpu),
            other => Err(anyhow!("unknown vm type {:?}, expected \"cpu\" or \"gpu\"", other)),
        }
    }
}
