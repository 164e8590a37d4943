//! Spear CLI binary

use anyhow::{bail, Context};
use clap::Parser;
use spear::cli::{verify_proof, Cli, Commands, SpearApp};
use spear::config::ProtocolConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scheme,
            amount,
            parts,
            redundant,
            balance,
            config,
        } => {
            let mut protocol = match config {
                Some(path) => ProtocolConfig::from_file(&path)
                    .with_context(|| format!("loading config from {}", path.display()))?,
                None => ProtocolConfig::default(),
            };
            if let Some(scheme) = scheme {
                protocol.scheme = scheme;
            }
            if let Some(parts) = parts {
                protocol.parts_count = parts;
            }
            if let Some(redundant) = redundant {
                protocol.redundant_parts_count = redundant;
            }
            if let Some(balance) = balance {
                protocol.initial_balance = balance;
            }

            tracing::info!(
                "Running {} payment of {} over {}+{} parts",
                protocol.scheme,
                amount,
                protocol.parts_count,
                protocol.redundant_parts_count
            );

            let app = SpearApp::new(protocol).context("setting up payer and payee")?;
            let Some(outcome) = app.run_payment(amount).await.context("running payment")? else {
                bail!("payee never received enough parts to claim the invoice");
            };

            println!("scheme:        {}", app.config().scheme);
            println!("payment id:    {}", outcome.payment_id);
            println!("invoice key:   {}", outcome.key.to_hex());
            println!(
                "parts:         {} created, {} claimed",
                outcome.parts_created, outcome.parts_claimed
            );
            println!(
                "payer balance: {} available, {} locked",
                outcome.payer_balance.available, outcome.payer_balance.locked
            );
            println!(
                "payee claimed: {}",
                app.payee().is_claimed(&outcome.payment_id)
            );
            println!("proof:         {}", outcome.proof.to_hex());
        }

        Commands::Verify { scheme, key, proof } => {
            let ok = verify_proof(scheme, &key, &proof).context("decoding key or proof")?;
            if !ok {
                bail!("proof does not open the invoice key");
            }
            println!("proof valid");
        }
    }

    Ok(())
}
