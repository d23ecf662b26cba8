use crate::error::ConfigError;
use crate::model::MerchantCredentials;

pub const MERCHANT_ID_VAR: &str = "NAGAD_MERCHANT_ID";
pub const PRIVATE_KEY_VAR: &str = "NAGAD_PRIVATE_KEY";
pub const PUBLIC_KEY_VAR: &str = "NAGAD_PUBLIC_KEY";
pub const CALLBACK_URL_VAR: &str = "NAGAD_CALLBACK_URL";
pub const CLIENT_IP_VAR: &str = "NAGAD_CLIENT_IP";
pub const BASE_URL_VAR: &str = "NAGAD_BASE_URL";

/// Value of a required environment variable.
pub fn env_var(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnv(name))
}

impl MerchantCredentials {
    /// Reads credentials from `NAGAD_*` environment variables.
    ///
    /// Call `dotenv::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let var = |name: &'static str| lookup(name).ok_or(ConfigError::MissingEnv(name));

        let credentials = Self {
            merchant_id: var(MERCHANT_ID_VAR)?,
            private_key: var(PRIVATE_KEY_VAR)?,
            public_key: var(PUBLIC_KEY_VAR)?,
            callback_url: var(CALLBACK_URL_VAR)?,
            client_ip: var(CLIENT_IP_VAR)?,
            base_url: var(BASE_URL_VAR)?,
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Every field must be non-blank before any request is made.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("merchant_id", &self.merchant_id),
            ("private_key", &self.private_key),
            ("public_key", &self.public_key),
            ("callback_url", &self.callback_url),
            ("client_ip", &self.client_ip),
            ("base_url", &self.base_url),
        ];

        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(ConfigError::MissingField(*name)),
            None => Ok(()),
        }
    }

    /// Base URL without a trailing `/`, ready for path joins.
    pub fn gateway_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
