use clap::{Parser, Subcommand};

mod utils;

mod verify;
use verify::VerifyCli;

mod hash;
use hash::HashCli;

mod debug;
use debug::DebugCli;

#[derive(Parser)]
#[command(name = "nilcc-attest-cli")]
#[command(version)]
struct NilccAttestCli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a workload's attestation report against an expected measurement
    Verify(VerifyCli),
    /// Hash a docker-compose file and print the measurement command
    Hash(HashCli),
    #[command(subcommand)]
    Debug(DebugCli),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = NilccAttestCli::parse();
    match &cli.command {
        Commands::Verify(cli) => cli.run(),
        Commands::Hash(cli) => cli.run(),
        Commands::Debug(cli) => cli.run(),
    }
}
