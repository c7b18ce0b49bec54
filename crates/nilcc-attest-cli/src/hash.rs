use std::{io::Read, path::PathBuf};

use anyhow::Context;
use clap::{builder::NonEmptyStringValueParser, Args};
use nilcc_attestation_verifier::{ComposeHashResult, VmType, DEFAULT_NILCC_VERSION, MAX_CPUS, MIN_CPUS};

use crate::utils::emit_json;

/// Hashes a docker-compose document and prints the `nilcc-verifier` command
/// that derives the expected measurement hash from it.
#[derive(Args)]
pub struct HashCli {
    /// Path to the docker-compose file, or `-` to read stdin
    #[arg(long)]
    compose: PathBuf,

    #[arg(long, default_value = DEFAULT_NILCC_VERSION, value_parser = NonEmptyStringValueParser::new())]
    nilcc_version: String,

    #[arg(long, default_value_t = MIN_CPUS, value_parser = clap::value_parser!(u32).range(MIN_CPUS as i64..=MAX_CPUS as i64))]
    cpus: u32,

    /// cpu or gpu
    #[arg(long, default_value_t = VmType::Cpu)]
    vm_type: VmType,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl HashCli {
    pub fn run(&self) -> anyhow::Result<()> {
        let content = self.read_compose()?;
        let result =
            ComposeHashResult::new(&content, &self.nilcc_version, self.cpus, self.vm_type);
        tracing::debug!("hashed {} bytes of compose content", content.len());

        if self.json {
            return emit_json(&result, None);
        }
        println!("docker-compose hash: {}", result.content_hash);
        println!("verifier command: {}", result.command);
        Ok(())
    }

    fn read_compose(&self) -> anyhow::Result<String> {
        if self.compose.as_os_str() == "-" {
            return read_compose_from(std::io::stdin())
                .context("failed to read compose document from stdin");
        }
        std::fs::read_to_string(&self.compose)
            .with_context(|| format!("failed to read compose file {}", self.compose.display()))
    }
}

/// Reads the whole stream; input that is not UTF-8 is rejected.
fn read_compose_from<R: Read>(mut reader: R) -> anyhow::Result<String> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[clap(flatten)]
        hash: HashCli,
    }

    fn parse(args: &[&str]) -> Result<HashCli, clap::Error> {
        Wrapper::try_parse_from(std::iter::once("hash").chain(args.iter().copied()))
            .map(|w| w.hash)
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--compose", "docker-compose.yml"]).unwrap();
        assert_eq!(cli.nilcc_version, "0.2.1");
        assert_eq!(cli.cpus, 1);
        assert_eq!(cli.vm_type, VmType::Cpu);
        assert!(!cli.json);
    }

    #[test]
    fn test_cpu_range() {
        assert!(parse(&["--compose", "c.yml", "--cpus", "16"]).is_ok());
        assert!(parse(&["--compose", "c.yml", "--cpus", "0"]).is_err());
        assert!(parse(&["--compose", "c.yml", "--cpus", "17"]).is_err());
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(parse(&["--compose", "c.yml", "--nilcc-version", ""]).is_err());
        assert!(parse(&["--compose", "c.yml", "--vm-type", "tpu"]).is_err());
        let cli = parse(&["--compose", "c.yml", "--vm-type", "gpu"]).unwrap();
        assert_eq!(cli.vm_type, VmType::Gpu);
    }

    #[test]
    fn test_reads_compose_file_verbatim() {
        let path = std::env::temp_dir().join(format!("nilcc-compose-{}.yml", std::process::id()));
        std::fs::write(&path, "services:\r\n  web: {}\r\n\n").unwrap();

        let cli = parse(&["--compose", path.to_str().unwrap()]).unwrap();
        let content = cli.read_compose().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(content, "services:\r\n  web: {}\r\n\n");
    }

    #[test]
    fn test_reads_stream_verbatim() {
        let content = read_compose_from(&b"services:\n  db: {}\n"[..]).unwrap();
        assert_eq!(content, "services:\n  db: {}\n");
    }

    #[test]
    fn test_rejects_non_utf8_stream() {
        assert!(read_compose_from(&[0x73u8, 0xff, 0xfe][..]).is_err());
    }

    #[test]
    fn test_missing_compose_file() {
        let cli = parse(&["--compose", "/nonexistent/docker-compose.yml"]).unwrap();
        let err = cli.read_compose().unwrap_err();
        assert!(format!("{:#}", err).contains("failed to read compose file"));
    }
}
