//! RSA primitives required by the gateway contract.
//!
//! The gateway mandates PKCS#1 v1.5 padding for both encryption and
//! signatures (SHA-256), with keys exchanged as bare PEM bodies. Keys are
//! parsed on every call so a bad key surfaces as the error of the operation
//! that needed it.

use std::fmt;

use base64::prelude::*;
use openssl::error::ErrorStack;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private, Public};
use openssl::rsa::{Padding, Rsa};
use openssl::sign::{Signer, Verifier};

use crate::error::CryptoError;

const PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";
const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";
const PEM_LINE_WIDTH: usize = 64;
/// Bytes of a PKCS#1 v1.5 block taken by padding.
const PKCS1_OVERHEAD: usize = 11;

/// Frames a bare PEM body as a PEM document.
///
/// `body` is the base64 key material only, without `-----BEGIN` / `-----END`
/// lines. Whitespace inside it is ignored, so both single-line keys (the way
/// the gateway portal hands them out) and 64-column bodies are accepted.
pub fn frame_pem(label: &str, body: &str) -> String {
    let compact: Vec<char> = body.chars().filter(|c| !c.is_whitespace()).collect();

    let mut pem = format!("-----BEGIN {label}-----\n");
    for line in compact.chunks(PEM_LINE_WIDTH) {
        pem.extend(line);
        pem.push('\n');
    }
    pem.push_str(&format!("-----END {label}-----\n"));
    pem
}

/// Parses a merchant private key given as a PKCS#1 PEM body.
pub fn load_private_key(body: &str) -> Result<Rsa<Private>, ErrorStack> {
    Rsa::private_key_from_pem(frame_pem(PRIVATE_KEY_LABEL, body).as_bytes())
}

/// Parses a gateway public key given as a SubjectPublicKeyInfo PEM body.
pub fn load_public_key(body: &str) -> Result<Rsa<Public>, ErrorStack> {
    Rsa::public_key_from_pem(frame_pem(PUBLIC_KEY_LABEL, body).as_bytes())
}

/// Checks a base64 signature produced by [`GatewayCipher::sign`].
pub fn verify_signature(
    public_key: &str,
    plaintext: &str,
    signature: &str,
) -> Result<bool, CryptoError> {
    let fail = |e: ErrorStack| CryptoError::Signature(e.to_string());

    let signature = BASE64_STANDARD
        .decode(signature)
        .map_err(|e| CryptoError::Signature(format!("signature is not base64: {e}")))?;
    let pkey = PKey::from_rsa(load_public_key(public_key).map_err(fail)?).map_err(fail)?;

    let mut verifier = Verifier::new(MessageDigest::sha256(), &pkey).map_err(fail)?;
    verifier.set_rsa_padding(Padding::PKCS1).map_err(fail)?;
    verifier.update(plaintext.as_bytes()).map_err(fail)?;
    verifier.verify(&signature).map_err(fail)
}

/// Key pair used for one merchant: our private key and the gateway's public key.
#[derive(Clone)]
pub struct GatewayCipher {
    merchant_private_key: String,
    gateway_public_key: String,
}

impl GatewayCipher {
    pub fn new(merchant_private_key: &str, gateway_public_key: &str) -> Self {
        Self {
            merchant_private_key: merchant_private_key.to_string(),
            gateway_public_key: gateway_public_key.to_string(),
        }
    }

    /// SHA-256 / PKCS#1 v1.5 signature over `plaintext`, base64 encoded.
    pub fn sign(&self, plaintext: &str) -> Result<String, CryptoError> {
        let fail = |e: ErrorStack| CryptoError::Signature(e.to_string());

        let rsa = load_private_key(&self.merchant_private_key).map_err(|e| {
            CryptoError::Signature(format!("invalid merchant private key: {e}"))
        })?;
        let pkey = PKey::from_rsa(rsa).map_err(fail)?;

        let mut signer = Signer::new(MessageDigest::sha256(), &pkey).map_err(fail)?;
        signer.set_rsa_padding(Padding::PKCS1).map_err(fail)?;
        signer.update(plaintext.as_bytes()).map_err(fail)?;
        let signature = signer.sign_to_vec().map_err(fail)?;

        Ok(BASE64_STANDARD.encode(signature))
    }

    /// Encrypts `plaintext` for the gateway, base64 encoded.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let rsa = load_public_key(&self.gateway_public_key).map_err(|e| {
            CryptoError::Encryption(format!("invalid gateway public key: {e}"))
        })?;

        let size = rsa.size() as usize;
        let capacity = size.saturating_sub(PKCS1_OVERHEAD);
        if plaintext.len() > capacity {
            return Err(CryptoError::Encryption(format!(
                "plaintext of {} bytes exceeds the {capacity} byte capacity of the gateway key",
                plaintext.len()
            )));
        }

        let mut encrypted = vec![0; size];
        let len = rsa
            .public_encrypt(plaintext.as_bytes(), &mut encrypted, Padding::PKCS1)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;
        encrypted.truncate(len);

        Ok(BASE64_STANDARD.encode(encrypted))
    }

    /// Decrypts gateway ciphertext (already base64 decoded) into UTF-8 text.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<String, CryptoError> {
        let rsa = load_private_key(&self.merchant_private_key).map_err(|e| {
            CryptoError::Decryption(format!("invalid merchant private key: {e}"))
        })?;

        let mut decrypted = vec![0; rsa.size() as usize];
        let len = rsa
            .private_decrypt(ciphertext, &mut decrypted, Padding::PKCS1)
            .map_err(|e| CryptoError::Decryption(e.to_string()))?;
        decrypted.truncate(len);

        String::from_utf8(decrypted)
            .map_err(|e| CryptoError::Decryption(format!("plaintext is not UTF-8: {e}")))
    }

    /// Base64 decodes then [`decrypt`](Self::decrypt)s.
    pub fn decrypt_base64(&self, ciphertext: &str) -> Result<String, CryptoError> {
        let bytes = BASE64_STANDARD
            .decode(ciphertext.trim())
            .map_err(|e| CryptoError::Decryption(format!("ciphertext is not base64: {e}")))?;
        self.decrypt(&bytes)
    }
}

impl fmt::Debug for GatewayCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayCipher")
            .field("merchant_private_key", &"[REDACTED]")
            .field("gateway_public_key", &"[REDACTED]")
            .finish()
    }
}
