//! Environment-driven configuration for the API and auth clients.
//!
//! Every client needs its own credentials; a missing one is reported as
//! [`YooPayError::Config`] when that client is built, not later at request
//! time.

use secrecy::SecretString;
use url::Url;

use crate::error::{Result, YooPayError};

/// Default base URL of the payment API.
pub const DEFAULT_PAYMENT_API_URL: &str = "https://payment.yooga.com.br";

/// Default base URL of the second API host ("api4").
pub const DEFAULT_API4_URL: &str = "https://api4.yooga.com.br";

/// Environment variable overriding the payment API base URL.
pub const PAYMENT_API_URL_ENV: &str = "YOOPAY_PAYMENT_API_URL";
/// Environment variable holding the payment API bearer token.
pub const PAYMENT_TOKEN_ENV: &str = "YOOPAY_PAYMENT_TOKEN";
/// Environment variable overriding the api4 base URL.
pub const API4_URL_ENV: &str = "YOOPAY_API4_URL";
/// Environment variable holding the api4 bearer token.
pub const API4_TOKEN_ENV: &str = "YOOPAY_API4_TOKEN";
/// Environment variable holding the auth backend URL.
pub const AUTH_URL_ENV: &str = "YOOPAY_AUTH_URL";
/// Environment variable holding the auth backend anonymous key.
pub const AUTH_ANON_KEY_ENV: &str = "YOOPAY_AUTH_ANON_KEY";

/// Base URLs and bearer tokens for both API hosts.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Payment API base URL.
    pub payment_url: Url,
    /// Payment API bearer token.
    pub payment_token: SecretString,
    /// api4 base URL (fees and banking writes).
    pub api4_url: Url,
    /// api4 bearer token.
    pub api4_token: SecretString,
}

impl ApiConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`YooPayError::Config`] if a token is missing or a URL is
    /// malformed.
    #[inline]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`YooPayError::Config`] if a token is missing or a URL is
    /// malformed.
    #[inline]
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let payment_url = optional_url(&lookup, PAYMENT_API_URL_ENV, DEFAULT_PAYMENT_API_URL)?;
        let api4_url = optional_url(&lookup, API4_URL_ENV, DEFAULT_API4_URL)?;
        let payment_token = required(&lookup, PAYMENT_TOKEN_ENV)?;
        let api4_token = required(&lookup, API4_TOKEN_ENV)?;
        tracing::debug!(payment_url = %payment_url, api4_url = %api4_url, "loaded API configuration");
        Ok(Self {
            payment_url,
            payment_token: SecretString::from(payment_token),
            api4_url,
            api4_token: SecretString::from(api4_token),
        })
    }
}

/// Location and anonymous key of the auth backend.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Auth backend base URL.
    pub url: Url,
    /// Anonymous (public) API key sent as the `apikey` header.
    pub anon_key: SecretString,
}

impl AuthConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`YooPayError::Config`] if either variable is missing or the
    /// URL is malformed.
    #[inline]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`YooPayError::Config`] if either variable is missing or the
    /// URL is malformed.
    #[inline]
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let raw_url = required(&lookup, AUTH_URL_ENV)?;
        let url = parse_url(AUTH_URL_ENV, &raw_url)?;
        let anon_key = required(&lookup, AUTH_ANON_KEY_ENV)?;
        Ok(Self {
            url,
            anon_key: SecretString::from(anon_key),
        })
    }
}

/// Returns a non-blank variable or a configuration error naming it.
fn required<F: Fn(&str) -> Option<String>>(lookup: &F, name: &str) -> Result<String> {
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| YooPayError::Config(format!("{name} is not set")))
}

/// Returns the URL in `name`, falling back to `default` when unset.
fn optional_url<F: Fn(&str) -> Option<String>>(
    lookup: &F,
    name: &str,
    default: &str,
) -> Result<Url> {
    match lookup(name).filter(|value| !value.trim().is_empty()) {
        Some(raw) => parse_url(name, raw.trim()),
        None => parse_url(name, default),
    }
}

/// Parses an absolute base URL.
pub(crate) fn parse_url(name: &str, raw: &str) -> Result<Url> {
    let parsed = Url::parse(raw)
        .map_err(|err| YooPayError::Config(format!("{name} is not a valid URL: {err}")))?;
    if parsed.cannot_be_a_base() {
        return Err(YooPayError::Config(format!(
            "{name} cannot be used as a base URL"
        )));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret as _;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|&(key, value)| (key.to_owned(), value.to_owned()))
            .collect()
    }

    #[test]
    fn api_config_uses_default_urls() {
        let env = vars(&[(PAYMENT_TOKEN_ENV, "pay"), (API4_TOKEN_ENV, "api4")]);
        let config = ApiConfig::from_lookup(|name| env.get(name).cloned()).unwrap();
        assert_eq!(config.payment_url.as_str(), "https://payment.yooga.com.br/");
        assert_eq!(config.api4_url.as_str(), "https://api4.yooga.com.br/");
        assert_eq!(config.payment_token.expose_secret(), "pay");
        assert_eq!(config.api4_token.expose_secret(), "api4");
    }

    #[test]
    fn api_config_missing_token_is_config_error() {
        let env = vars(&[(PAYMENT_TOKEN_ENV, "pay")]);
        let err = ApiConfig::from_lookup(|name| env.get(name).cloned()).unwrap_err();
        assert!(matches!(err, YooPayError::Config(msg) if msg.contains(API4_TOKEN_ENV)));
    }

    #[test]
    fn api_config_blank_token_is_config_error() {
        let env = vars(&[(PAYMENT_TOKEN_ENV, "   "), (API4_TOKEN_ENV, "api4")]);
        let err = ApiConfig::from_lookup(|name| env.get(name).cloned()).unwrap_err();
        assert!(matches!(err, YooPayError::Config(_)));
    }

    #[test]
    fn api_config_rejects_invalid_url() {
        let env = vars(&[
            (PAYMENT_TOKEN_ENV, "pay"),
            (API4_TOKEN_ENV, "api4"),
            (PAYMENT_API_URL_ENV, "not a url"),
        ]);
        let err = ApiConfig::from_lookup(|name| env.get(name).cloned()).unwrap_err();
        assert!(matches!(err, YooPayError::Config(msg) if msg.contains(PAYMENT_API_URL_ENV)));
    }

    #[test]
    fn auth_config_requires_both_variables() {
        let env = vars(&[(AUTH_URL_ENV, "https://auth.example.com")]);
        assert!(AuthConfig::from_lookup(|name| env.get(name).cloned()).is_err());

        let env = vars(&[
            (AUTH_URL_ENV, "https://auth.example.com"),
            (AUTH_ANON_KEY_ENV, "anon"),
        ]);
        let config = AuthConfig::from_lookup(|name| env.get(name).cloned()).unwrap();
        assert_eq!(config.url.host_str(), Some("auth.example.com"));
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let env = vars(&[(PAYMENT_TOKEN_ENV, "super-secret"), (API4_TOKEN_ENV, "api4")]);
        let config = ApiConfig::from_lookup(|name| env.get(name).cloned()).unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
