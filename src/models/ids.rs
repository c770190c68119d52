//! Newtype wrappers for identifiers.
//!
//! These prevent accidentally mixing up a merchant identifier typed by
//! staff with the numeric id of a PIX validation request.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, YooPayError};

/// Merchant identifier as typed into the search box (usually the
/// marketplace id, sometimes a document or legacy code).
///
/// Only built through [`MerchantId::parse`], so it is never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MerchantId(String);

impl MerchantId {
    /// Parses a merchant identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`YooPayError::Validation`] if the input is blank.
    #[inline]
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(YooPayError::Validation(
                "Digite um ID válido para buscar o cliente.".to_owned(),
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the trimmed identifier.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the identifier as an IDI for request bodies.
    #[inline]
    #[must_use]
    pub fn to_idi(&self) -> Idi {
        self.0
            .parse::<i64>()
            .map_or_else(|_| Idi::Text(self.0.clone()), Idi::Numeric)
    }
}

impl FromStr for MerchantId {
    type Err = YooPayError;

    #[inline]
    fn from_str(raw: &str) -> Result<Self> {
        Self::parse(raw)
    }
}

impl core::fmt::Display for MerchantId {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric id of a pending PIX validation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationRequestId(i64);

impl ValidationRequestId {
    /// Wraps a request id received from the server or typed by staff.
    #[inline]
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the numeric id.
    #[inline]
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for ValidationRequestId {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Internal merchant identifier used in API request bodies.
///
/// Numeric identifiers are sent as JSON numbers, anything else as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Idi {
    /// Numeric marketplace id.
    Numeric(i64),
    /// Non-numeric identifier.
    Text(String),
}
