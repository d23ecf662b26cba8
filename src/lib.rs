//! Client for the Nagad payment gateway.
//!
//! [`Checkout`] runs the two-phase checkout handshake, [`PaymentVerifier`]
//! checks the outcome, and [`PaymentCallback`] parses the redirect the
//! customer comes back with.

#[macro_use]
extern crate tracing;

pub mod checkout;
pub mod config;
pub mod encryption;
pub mod error;
pub mod model;
pub mod protocol;
pub mod util;
pub mod verify;
pub mod webhook;

#[cfg(test)]
mod test_support;

pub use checkout::Checkout;
pub use error::{
    CallbackError, CheckoutError, ConfigError, CryptoError, PhaseError, RequestError,
    VerificationError,
};
pub use model::MerchantCredentials;
pub use protocol::{HttpTransport, Transport};
pub use verify::PaymentVerifier;
pub use webhook::PaymentCallback;
