use serde_json::Value;

use crate::error::{ConfigError, VerificationError};
use crate::protocol::{HttpTransport, Transport};

/// Looks up the status of a payment after the customer was sent back to the
/// callback URL.
#[derive(Debug, Clone)]
pub struct PaymentVerifier<T = HttpTransport> {
    base_url: String,
    transport: T,
}

impl PaymentVerifier<HttpTransport> {
    pub fn new(base_url: &str, client_ip: &str) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(client_ip)?;
        Self::with_transport(base_url, transport)
    }
}

impl<T: Transport> PaymentVerifier<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Result<Self, ConfigError> {
        if base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("base_url"));
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        })
    }

    pub fn verify_payment(&self, payment_reference_id: &str) -> Result<Value, VerificationError> {
        let url = format!("{}/verify/payment/{}", self.base_url, payment_reference_id);
        info!("Verifying payment {}", payment_reference_id);

        self.transport.get(&url).map_err(|e| {
            warn!("Verification of payment {} failed: {}", payment_reference_id, e);
            VerificationError::from(e)
        })
    }
}
