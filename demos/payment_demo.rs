//! Payment demo: every lock scheme end to end
//!
//! 1. Payee issues an invoice
//! 2. Payer locks redundant parts
//! 3. A random subset is forwarded
//! 4. Payer reveals, payee claims
//! 5. Proof is checked by a third party holding only the invoice key
//!
//! Run with: cargo run --example payment_demo

use spear::cli::{verify_proof, SpearApp};
use spear::config::ProtocolConfig;
use spear::crypto::Scheme;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info,spear=debug")
        .init();

    println!("\n╔══════════════════════════════════════════════╗");
    println!("║   Spear Redundant Multipath Payment Demo     ║");
    println!("╚══════════════════════════════════════════════╝\n");

    for scheme in [Scheme::HashLock, Scheme::SingleHashLock, Scheme::PointLock] {
        println!("┌─────────────────────────────────────────────┐");
        println!("│ Scheme: {:<36}│", scheme);
        println!("└─────────────────────────────────────────────┘");

        let config = ProtocolConfig {
            scheme,
            ..ProtocolConfig::default()
        };
        let app = SpearApp::new(config)?;

        println!("💸 Paying 100 over 5 parts + 2 redundant...");
        let Some(outcome) = app.run_payment(100).await? else {
            println!("   ❌ Not enough parts arrived\n");
            continue;
        };

        println!("   Payment id: {}", outcome.payment_id.short());
        println!(
            "   Parts: {} created, {} claimed",
            outcome.parts_created, outcome.parts_claimed
        );
        println!(
            "   Payer balance: {} available, {} locked",
            outcome.payer_balance.available, outcome.payer_balance.locked
        );

        let ok = verify_proof(scheme, &outcome.key.to_hex(), &outcome.proof.to_hex())?;
        println!(
            "   {} Proof {}\n",
            if ok { "✅" } else { "❌" },
            if ok { "verified" } else { "rejected" }
        );
    }

    Ok(())
}
