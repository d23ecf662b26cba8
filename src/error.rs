use serde_json::Value;
use thiserror::Error;

/// Failures of the RSA sign / encrypt / decrypt primitives.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("signature generation failed: {0}")]
    Signature(String),
    #[error("encryption failed: {0}")]
    Encryption(String),
    #[error("decryption failed: {0}")]
    Decryption(String),
}

/// Failures talking to the gateway over HTTP.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("request to gateway failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("gateway responded with status {status}: {body}")]
    Status { status: u16, body: Value },
    #[error("could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("could not decode gateway response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Low-level failure inside one phase of the checkout handshake.
#[derive(Error, Debug)]
pub enum PhaseError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("could not serialize sensitive data: {0}")]
    Serialize(String),
}

/// The only error surfaced by [`crate::checkout::Checkout::checkout_process`].
#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("payment initiation failed: {0}")]
    Initiation(#[source] PhaseError),
    #[error("payment completion failed: {0}")]
    Completion(#[source] PhaseError),
    /// The gateway answered, but not with the shape the protocol requires.
    #[error("unexpected gateway response: {0}")]
    Protocol(String),
}

impl CheckoutError {
    /// Status code of the gateway response that aborted the checkout, if any.
    pub fn gateway_status(&self) -> Option<u16> {
        match self {
            CheckoutError::Initiation(PhaseError::Request(RequestError::Status { status, .. }))
            | CheckoutError::Completion(PhaseError::Request(RequestError::Status {
                status, ..
            })) => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
#[error("payment verification failed: {0}")]
pub struct VerificationError(#[from] pub RequestError);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("merchant credentials are incomplete: `{0}` is empty")]
    MissingField(&'static str),
    #[error("environment variable `{0}` is not set")]
    MissingEnv(&'static str),
    #[error("could not build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CallbackError {
    #[error("callback query is missing `{0}`")]
    MissingField(&'static str),
    #[error("invalid callback URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
