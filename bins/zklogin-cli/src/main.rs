//! zkLogin session CLI.
//!
//! Drives one session persisted in a JSON file, so each step of the login
//! can run as its own process:
//!
//! ```bash
//! export ZKLOGIN_NETWORK=testnet
//! export ZKLOGIN_PROVER_URL=https://prover-dev.example.com
//! export ZKLOGIN_BACKEND_URL=https://api.example.com
//! export ZKLOGIN_CLIENT_ID=1234.apps.googleusercontent.com
//! export ZKLOGIN_REDIRECT_URI=https://app.example.com/callback
//!
//! zklogin login                                # prints the provider URL
//! zklogin callback 'https://app.example.com/callback#id_token=eyJ...'
//! zklogin sign "hello"
//! zklogin pay 1000000 --recipient 0x...
//! zklogin disconnect
//! ```
//!
//! `RUST_LOG=debug` shows each resolution step.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::ZkLoginConfig;
use sdk::{HttpSessionController, NoopObserver, SessionState};
use storage::FileSessionStore;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use transport::HttpConfig;

#[derive(Parser)]
#[command(name = "zklogin", version, about = "zkLogin session CLI")]
struct Cli {
    /// Session file.
    #[arg(long, env = "ZKLOGIN_STORE", default_value = "zklogin-session.json")]
    store: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a login and print the provider authorization URL.
    Login,

    /// Finish a login from the provider redirect URL (or its fragment).
    Callback { redirect: String },

    /// Show the session state and address.
    Status,

    /// Sign a UTF-8 message and print the composite signature.
    Sign { message: String },

    /// Pay `amount` base units to the configured recipient.
    Pay {
        amount: u64,
        /// Overrides ZKLOGIN_RECIPIENT.
        #[arg(long)]
        recipient: Option<String>,
    },

    /// Sign the session address and report it to the backend.
    ProveAddress,

    /// Clear every session field.
    Disconnect,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ZkLoginConfig::from_env().context("loading ZKLOGIN_* configuration")?;
    if let Command::Pay {
        recipient: Some(recipient),
        ..
    } = &cli.cmd
    {
        config.payment.recipient = Some(recipient.parse().context("invalid --recipient")?);
    }

    let cancel = CancellationToken::new();
    let controller = HttpSessionController::with_http(
        config,
        &HttpConfig::default(),
        FileSessionStore::new(cli.store.clone()),
        NoopObserver,
        cancel.clone(),
    )?;
    tracing::debug!(store = %cli.store.display(), state = ?controller.state(), "session loaded");

    // Ctrl-C aborts in-flight calls without touching the session file.
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    match cli.cmd {
        Command::Login => {
            let url = controller.start_login().await?;
            println!("{url}");
        }
        Command::Callback { redirect } => {
            let address = controller.complete_login(&redirect).await?;
            println!("{address}");
        }
        Command::Status => {
            if controller.state() == SessionState::Resolving {
                controller.initialize().await?;
            }
            println!("state: {:?}", controller.state());
            if let Some(address) = controller.address() {
                println!("address: {address}");
            }
        }
        Command::Sign { message } => {
            controller.initialize().await?;
            let signature = controller.sign_message(message.as_bytes()).await?;
            println!("{signature}");
        }
        Command::Pay { amount, .. } => {
            controller.initialize().await?;
            let receipt = controller.pay(amount).await?;
            println!("digest: {}", receipt.digest);
            if !receipt.reported {
                eprintln!("warning: payment was not reported to the backend");
            }
        }
        Command::ProveAddress => {
            controller.initialize().await?;
            let signature = controller.prove_address_ownership().await?;
            println!("{signature}");
        }
        Command::Disconnect => {
            controller.disconnect().await?;
            println!("disconnected");
        }
    }

    Ok(())
}
