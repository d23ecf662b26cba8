//! Two-phase checkout handshake.
//!
//! 1. *Initiate*: send a fresh challenge for the invoice and receive, encrypted
//!    for the merchant, a payment reference and the gateway's challenge.
//! 2. *Complete*: send the amount together with that challenge to the payment
//!    reference; the gateway answers with the URL the customer is sent to.
//!
//! Every sensitive payload is serialized once to canonical JSON, and that exact
//! text is both encrypted for the gateway and signed by the merchant.

use json_canon::to_string;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::encryption::GatewayCipher;
use crate::error::{CheckoutError, ConfigError, PhaseError};
use crate::model::{
    CheckoutRequest, CompleteRequest, CompleteSensitiveData, InitiateRequest,
    InitiateSensitiveData, InitiateSensitiveResponse, Initiated, MerchantCredentials, SealedData,
};
use crate::protocol::{HttpTransport, Transport};
use crate::util::{generate_challenge, get_timestamp, CHALLENGE_LENGTH};

/// Checkout orchestrator for one merchant.
///
/// Holds only immutable configuration, so one instance can serve concurrent
/// checkouts when the transport is `Sync`.
#[derive(Debug)]
pub struct Checkout<T = HttpTransport> {
    credentials: MerchantCredentials,
    cipher: GatewayCipher,
    transport: T,
}

impl Checkout<HttpTransport> {
    /// Orchestrator over HTTP with the default request timeout.
    pub fn new(credentials: MerchantCredentials) -> Result<Self, ConfigError> {
        credentials.validate()?;
        let transport = HttpTransport::new(&credentials.client_ip)?;
        Self::with_transport(credentials, transport)
    }
}

impl<T: Transport> Checkout<T> {
    /// Fails with [`ConfigError`] when any credential is blank; no request is
    /// ever made with partial credentials.
    pub fn with_transport(
        credentials: MerchantCredentials,
        transport: T,
    ) -> Result<Self, ConfigError> {
        credentials.validate()?;
        let cipher = GatewayCipher::new(&credentials.private_key, &credentials.public_key);
        Ok(Self {
            credentials,
            cipher,
            transport,
        })
    }

    pub fn merchant_id(&self) -> &str {
        &self.credentials.merchant_id
    }

    /// Runs initiate then complete for `invoice_number`, returning the
    /// gateway's completion response untouched.
    pub fn checkout_process(
        &self,
        amount: &str,
        invoice_number: &str,
    ) -> Result<Value, CheckoutError> {
        let request = CheckoutRequest::new(invoice_number, amount);
        info!("Starting checkout for invoice {}", request.invoice_number);

        let initiated = self.initiate(&request).map_err(|e| {
            warn!("Checkout for invoice {} failed: {}", request.invoice_number, e);
            e
        })?;
        info!(
            "Payment initiated for invoice {} with reference {}",
            request.invoice_number, initiated.payment_reference_id
        );

        let completed = self.complete(&request, &initiated).map_err(|e| {
            warn!("Checkout for invoice {} failed: {}", request.invoice_number, e);
            e
        })?;
        info!("Checkout completed for invoice {}", request.invoice_number);

        Ok(completed)
    }

    pub(crate) fn initiate(&self, request: &CheckoutRequest) -> Result<Initiated, CheckoutError> {
        let now = get_timestamp();
        let challenge = generate_challenge(CHALLENGE_LENGTH);

        let sensitive = InitiateSensitiveData {
            merchant_id: &self.credentials.merchant_id,
            order_id: &request.invoice_number,
            challenge: &challenge,
            datetime: &now,
        };
        let sealed = self.seal(&sensitive).map_err(CheckoutError::Initiation)?;

        let body = InitiateRequest {
            date_time: now,
            sensitive_data: sealed.sensitive_data,
            signature: sealed.signature,
        };
        let url = format!(
            "{}/check-out/initialize/{}/{}",
            self.credentials.gateway_url(),
            self.credentials.merchant_id,
            request.invoice_number
        );
        let response = self.post(&url, &body).map_err(CheckoutError::Initiation)?;

        let encrypted = response
            .get("sensitiveData")
            .and_then(Value::as_str)
            .filter(|data| !data.is_empty())
            .ok_or_else(|| {
                CheckoutError::Protocol("initiate response is missing `sensitiveData`".into())
            })?;

        let plaintext = self
            .cipher
            .decrypt_base64(encrypted)
            .map_err(|e| CheckoutError::Initiation(e.into()))?;
        let decrypted: InitiateSensitiveResponse =
            serde_json::from_str(&plaintext).map_err(|e| {
                CheckoutError::Protocol(format!("decrypted initiate data is malformed: {e}"))
            })?;

        let payment_reference_id = required(decrypted.payment_reference_id, "paymentReferenceId")?;
        let challenge = required(decrypted.challenge, "challenge")?;

        Ok(Initiated {
            payment_reference_id,
            challenge,
        })
    }

    pub(crate) fn complete(
        &self,
        request: &CheckoutRequest,
        initiated: &Initiated,
    ) -> Result<Value, CheckoutError> {
        let sensitive = CompleteSensitiveData {
            merchant_id: &self.credentials.merchant_id,
            order_id: &request.invoice_number,
            currency_code: request.currency_code,
            amount: &request.amount,
            challenge: &initiated.challenge,
        };
        let sealed = self.seal(&sensitive).map_err(CheckoutError::Completion)?;

        let body = CompleteRequest {
            date_time: get_timestamp(),
            sensitive_data: sealed.sensitive_data,
            signature: sealed.signature,
            merchant_callback_url: self.credentials.callback_url.clone(),
            additional_merchant_info: Map::new(),
        };
        let url = format!(
            "{}/check-out/complete/{}",
            self.credentials.gateway_url(),
            initiated.payment_reference_id
        );

        self.post(&url, &body).map_err(CheckoutError::Completion)
    }

    /// Canonical JSON of `sensitive`, encrypted and signed.
    fn seal<S: Serialize>(&self, sensitive: &S) -> Result<SealedData, PhaseError> {
        let value =
            serde_json::to_value(sensitive).map_err(|e| PhaseError::Serialize(e.to_string()))?;
        let plaintext = to_string(&value).map_err(|e| PhaseError::Serialize(e.to_string()))?;

        let sensitive_data = self.cipher.encrypt(&plaintext)?;
        let signature = self.cipher.sign(&plaintext)?;

        Ok(SealedData {
            sensitive_data,
            signature,
        })
    }

    fn post<B: Serialize>(&self, url: &str, body: &B) -> Result<Value, PhaseError> {
        let body = serde_json::to_value(body).map_err(|e| PhaseError::Serialize(e.to_string()))?;
        debug!("Sending checkout request to: {}", url);
        Ok(self.transport.post(url, &body)?)
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, CheckoutError> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| {
        CheckoutError::Protocol(format!("decrypted initiate data is missing `{field}`"))
    })
}
