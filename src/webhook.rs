use std::collections::HashMap;

use serde::Serialize;
use url::{form_urlencoded, Url};

use crate::error::CallbackError;

/// Query parameters the gateway appends when it redirects the customer back
/// to the merchant's callback URL.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PaymentCallback {
    pub merchant: String,
    pub order_id: String,
    pub payment_ref_id: String,
    pub status: String,
    pub status_code: String,
    pub message: String,
}

impl PaymentCallback {
    /// Parses the callback query string. A leading `?` or a full callback URL
    /// are accepted as well.
    pub fn from_query(query: &str) -> Result<Self, CallbackError> {
        let query = query.trim();
        let url;
        let query = if query.contains("://") {
            url = Url::parse(query)?;
            url.query().unwrap_or_default()
        } else {
            query.strip_prefix('?').unwrap_or(query)
        };

        let mut params: HashMap<String, String> =
            form_urlencoded::parse(query.as_bytes()).into_owned().collect();
        let mut take =
            |name: &'static str| params.remove(name).ok_or(CallbackError::MissingField(name));

        Ok(Self {
            merchant: take("merchant")?,
            order_id: take("order_id")?,
            payment_ref_id: take("payment_ref_id")?,
            status: take("status")?,
            status_code: take("status_code")?,
            message: take("message")?,
        })
    }

    /// Whether the customer completed the payment. Settlement should still be
    /// confirmed with [`crate::verify::PaymentVerifier::verify_payment`].
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}
