use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::Level;

use nagad_client::config::{env_var, BASE_URL_VAR, CLIENT_IP_VAR};
use nagad_client::{Checkout, MerchantCredentials, PaymentCallback, PaymentVerifier};

#[macro_use]
extern crate tracing;

/// Drive the Nagad checkout handshake from the command line.
///
/// Merchant credentials are read from `NAGAD_*` environment variables or a
/// `.env` file.
#[derive(Parser, Debug)]
#[command(name = "nagad-client", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initiate and complete a checkout, printing the gateway's redirect response.
    Checkout {
        /// Amount in BDT, e.g. 100.00
        amount: String,
        /// Merchant invoice number, unique per transaction
        invoice: String,
    },
    /// Look up the status of a payment reference.
    Verify { payment_ref_id: String },
    /// Parse the query string the gateway redirected the customer with.
    Callback { query: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output: Value = match cli.command {
        Command::Checkout { amount, invoice } => {
            let credentials = MerchantCredentials::from_env()?;
            info!("Loaded credentials for merchant {}", credentials.merchant_id);
            Checkout::new(credentials)?.checkout_process(&amount, &invoice)?
        }
        Command::Verify { payment_ref_id } => {
            let base_url = env_var(BASE_URL_VAR)?;
            let client_ip = env_var(CLIENT_IP_VAR).unwrap_or_default();
            PaymentVerifier::new(&base_url, &client_ip)?.verify_payment(&payment_ref_id)?
        }
        Command::Callback { query } => {
            let callback = PaymentCallback::from_query(&query)?;
            if !callback.is_success() {
                warn!(
                    "Payment {} for order {} ended with status {}",
                    callback.payment_ref_id, callback.order_id, callback.status
                );
            }
            serde_json::to_value(callback)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
