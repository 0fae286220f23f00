use crate::error::{Ids7Error, Ids7Result};
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

/// Environment variable consulted by [`BearerToken::from_env`].
pub const TOKEN_ENV_VAR: &str = "IDS7_TOKEN";

/// Callback token issued by IDS7 to a registered application.
///
/// The token never appears in `Debug` output.
#[derive(Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Read the token from the `IDS7_TOKEN` environment variable.
    pub fn from_env() -> Ids7Result<Self> {
        match std::env::var(TOKEN_ENV_VAR) {
            Ok(token) if !token.is_empty() => Ok(Self::new(token)),
            _ => Err(Ids7Error::MissingConfig(format!(
                "token is required. Set it via builder or {TOKEN_ENV_VAR} env var."
            ))),
        }
    }

    /// The `Authorization` header value, marked sensitive.
    pub fn header_value(&self) -> Ids7Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0.expose_secret()))
            .map_err(|source| Ids7Error::InvalidHeader {
                name: "Authorization",
                source,
            })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BearerToken(****)")
    }
}
