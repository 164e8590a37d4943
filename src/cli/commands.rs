//! CLI command definitions

use crate::crypto::Scheme;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spear")]
#[command(about = "Spear - redundant multipath payments over hash and point locks", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a payment between a local payer and payee
    Run {
        /// Lock scheme (hash, single or point)
        #[arg(short, long)]
        scheme: Option<Scheme>,

        /// Invoice amount
        #[arg(short, long, default_value = "100")]
        amount: u64,

        /// Parts needed to cover the invoice
        #[arg(short, long)]
        parts: Option<usize>,

        /// Extra redundant parts
        #[arg(short, long)]
        redundant: Option<usize>,

        /// Payer starting balance
        #[arg(short, long)]
        balance: Option<u64>,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Check a payment proof against an invoice key
    Verify {
        /// Lock scheme (hash, single or point)
        #[arg(short, long)]
        scheme: Scheme,

        /// Invoice key: payment hash or invoice point, hex
        #[arg(short, long)]
        key: String,

        /// Payment proof, hex
        #[arg(short, long)]
        proof: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::parse_from(["spear", "run", "--scheme", "point", "-p", "4", "-r", "1"]);
        match cli.command {
            Commands::Run {
                scheme,
                amount,
                parts,
                redundant,
                balance,
                config,
            } => {
                assert_eq!(scheme, Some(Scheme::PointLock));
                assert_eq!(amount, 100);
                assert_eq!(parts, Some(4));
                assert_eq!(redundant, Some(1));
                assert!(balance.is_none());
                assert!(config.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_scheme() {
        let result = Cli::try_parse_from(["spear", "verify", "-s", "rsa", "-k", "00", "-p", "00"]);
        assert!(result.is_err());
    }
}
