#![cfg(test)]
use std::sync::OnceLock;

use openssl::rsa::Rsa;

/// Strips `-----BEGIN`/`-----END` framing, keeping the base64 lines.
pub fn pem_body(pem: &[u8], separator: &str) -> String {
    String::from_utf8_lossy(pem)
        .lines()
        .filter(|line| !line.starts_with("-----"))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Fresh 2048-bit RSA key pair as bare PEM bodies.
pub struct KeyPair {
    /// PKCS#1 private key body on a single line.
    pub private_body: String,
    /// SubjectPublicKeyInfo body on a single line.
    pub public_body: String,
    /// Same public key, 64-column lines.
    pub public_body_multiline: String,
}

impl KeyPair {
    pub fn generate() -> Self {
        let rsa = Rsa::generate(2048).unwrap();
        let private_pem = rsa.private_key_to_pem().unwrap();
        let public_pem = rsa.public_key_to_pem().unwrap();

        Self {
            private_body: pem_body(&private_pem, ""),
            public_body: pem_body(&public_pem, ""),
            public_body_multiline: pem_body(&public_pem, "\n"),
        }
    }
}

/// Merchant and gateway key pairs, generated once per test binary.
pub fn merchant_and_gateway() -> &'static (KeyPair, KeyPair) {
    static KEYS: OnceLock<(KeyPair, KeyPair)> = OnceLock::new();
    KEYS.get_or_init(|| (KeyPair::generate(), KeyPair::generate()))
}
