use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// ISO 4217 numeric code for BDT, the only currency the gateway settles in.
pub const CURRENCY_CODE_BDT: &str = "050";

/// Everything needed to talk to the gateway on behalf of one merchant.
#[derive(Clone, Deserialize)]
pub struct MerchantCredentials {
    pub merchant_id: String,
    /// Merchant RSA private key, PKCS#1 PEM body without framing.
    pub private_key: String,
    /// Gateway RSA public key, SubjectPublicKeyInfo PEM body without framing.
    pub public_key: String,
    pub callback_url: String,
    /// IPv4 address of the merchant server, sent as `X-KM-IP-V4`.
    pub client_ip: String,
    pub base_url: String,
}

impl fmt::Debug for MerchantCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantCredentials")
            .field("merchant_id", &self.merchant_id)
            .field("private_key", &"[REDACTED]")
            .field("public_key", &"[REDACTED]")
            .field("callback_url", &self.callback_url)
            .field("client_ip", &self.client_ip)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub invoice_number: String,
    /// Decimal amount in BDT, e.g. `"100.00"`.
    pub amount: String,
    pub currency_code: &'static str,
}

impl CheckoutRequest {
    pub fn new(invoice_number: &str, amount: &str) -> Self {
        Self {
            invoice_number: invoice_number.to_string(),
            amount: amount.to_string(),
            currency_code: CURRENCY_CODE_BDT,
        }
    }
}

/// Plaintext sealed into the initiate request.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InitiateSensitiveData<'a> {
    pub merchant_id: &'a str,
    pub order_id: &'a str,
    pub challenge: &'a str,
    pub datetime: &'a str,
}

/// Plaintext sealed into the complete request.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSensitiveData<'a> {
    pub merchant_id: &'a str,
    pub order_id: &'a str,
    pub currency_code: &'a str,
    pub amount: &'a str,
    pub challenge: &'a str,
}

/// A sensitive payload after encryption and signing.
#[derive(Debug)]
pub struct SealedData {
    pub sensitive_data: String,
    pub signature: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InitiateRequest {
    pub date_time: String,
    pub sensitive_data: String,
    pub signature: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    pub date_time: String,
    pub sensitive_data: String,
    pub signature: String,
    #[serde(rename = "merchantCallbackURL")]
    pub merchant_callback_url: String,
    pub additional_merchant_info: Map<String, Value>,
}

/// Decrypted `sensitiveData` of a successful initiate response.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct InitiateSensitiveResponse {
    pub payment_reference_id: Option<String>,
    pub challenge: Option<String>,
}

/// Checkout state between the two phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initiated {
    pub payment_reference_id: String,
    /// Challenge issued by the gateway, forwarded as-is into the complete call.
    pub challenge: String,
}
