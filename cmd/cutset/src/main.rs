//! cutset CLI - inspect, validate and batch speech cut manifests.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;

use commands::{BatchesCommand, FeaturesCommand, InspectCommand, ValidateCommand};

/// cutset CLI - work with cut manifests from the command line.
///
/// Manifests are JSON arrays or JSON Lines (`.jsonl`) of cuts. Supported
/// operations:
///   - Validate a manifest
///   - Inspect totals or a single cut
///   - Precompute filterbank features
///   - Iterate batches through one of the datasets
///
/// Feature and sampler settings are read from ~/.cutset/config.yaml.
#[derive(Parser)]
#[command(name = "cutset")]
#[command(about = "Speech cut manifest tool")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.cutset/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Output as JSON (default is YAML)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a manifest for consistency
    Validate(ValidateCommand),
    /// Summarize a manifest or print one cut
    Inspect(InspectCommand),
    /// Compute filterbank features for every cut
    Features(FeaturesCommand),
    /// Iterate batches and report their shapes
    Batches(BatchesCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
            .with_target(false)
            .init();
    }

    match &cli.command {
        Commands::Validate(cmd) => cmd.run(&cli),
        Commands::Inspect(cmd) => cmd.run(&cli),
        Commands::Features(cmd) => cmd.run(&cli),
        Commands::Batches(cmd) => cmd.run(&cli),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["cutset", "validate", "cuts.jsonl", "-v", "--json"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Validate(_)));
    }

    #[test]
    fn test_parse_batches() {
        let cli = Cli::try_parse_from([
            "cutset",
            "--config",
            "my.yaml",
            "batches",
            "cuts.json",
            "--mode",
            "on-the-fly",
            "--epoch",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some("my.yaml"));
        assert!(matches!(cli.command, Commands::Batches(_)));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(Cli::try_parse_from(["cutset", "batches", "cuts.json", "--mode", "video"]).is_err());
    }
}
