//! Client-side half of measurement verification.
//!
//! The expected measurement hash of a nilCC workload is derived by the
//! external `nilcc-verifier` image from the docker-compose hash, the nilCC
//! version, the CPU count and the VM type. This module computes the compose
//! hash and formats the command a user runs to obtain the measurement; it
//! never executes anything itself.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::VmType;

pub const VERIFIER_IMAGE: &str = "ghcr.io/nillionnetwork/nilcc-verifier:0.3.0";
pub const DEFAULT_NILCC_VERSION: &str = "0.2.1";
pub const MIN_CPUS: u32 = 1;
pub const MAX_CPUS: u32 = 16;

/// SHA-256 over the exact UTF-8 bytes of `content`, lowercase hex.
/// No whitespace or line-ending normalization is applied.
pub fn hash_compose(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

pub fn build_verifier_command(hash: &str, version: &str, cpus: u32, vm_type: VmType) -> String {
    format!(
        "docker run --rm {} measurement-hash {} {} --vm-type {} --cpus {}",
        VERIFIER_IMAGE, hash, version, vm_type, cpus
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeHashResult {
    pub content_hash: String,
    pub command: String,
}

impl ComposeHashResult {
    pub fn new(content: &str, version: &str, cpus: u32, vm_type: VmType) -> Self {
        let content_hash = hash_compose(content);
        let command = build_verifier_command(&content_hash, version, cpus, vm_type);
        Self {
            content_hash,
            command,
        }
    }
}
