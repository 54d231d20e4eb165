mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::{AmiArgs, LookupArgs, RolloutArgs};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an AMI from an EC2 instance
    Ami(AmiArgs),
    /// Resolve a private IP to a running instance id
    Lookup(LookupArgs),
    /// Roll a fresh AMI out to an Auto Scaling Group / Launch Template
    Rollout(RolloutArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    use Commands::*;
    match cli.command {
        Ami(args) => args.main().await,
        Lookup(args) => args.main().await,
        Rollout(args) => args.main().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn rollout_flags_parse() {
        let cli = Cli::try_parse_from([
            "fleet-rs",
            "rollout",
            "--instance-id",
            "i-0abc",
            "--asg-name",
            "web-fleet",
            "--target",
            "launch-config",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Rollout(_)));
    }

    #[test]
    fn lookup_requires_an_ip() {
        assert!(Cli::try_parse_from(["fleet-rs", "lookup"]).is_err());
    }
}
