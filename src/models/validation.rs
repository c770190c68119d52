//! Pending PIX validation requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MarketplaceFee, ValidationRequestId};

/// A merchant's request to have PIX enabled, waiting for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixValidationRequest {
    /// Request id, used to approve or reject it.
    pub id: ValidationRequestId,
    /// Origin system id of the merchant.
    #[serde(default)]
    pub origin_id: String,
    /// JSON-encoded [`PixPayload`].
    #[serde(default)]
    pub payload: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-deletion timestamp.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Whether the merchant is also switching plans.
    #[serde(default)]
    pub switch_plan: bool,
}

impl PixValidationRequest {
    /// Decodes the embedded payload.
    ///
    /// Returns `None` when the payload is not valid JSON of the expected
    /// shape; such requests are still listed, just without details.
    #[inline]
    #[must_use]
    pub fn parse_payload(&self) -> Option<PixPayload> {
        match serde_json::from_str(&self.payload) {
            Ok(payload) => Some(payload),
            Err(err) => {
                tracing::debug!(id = %self.id, error = %err, "unparseable PIX validation payload");
                None
            }
        }
    }
}

/// Merchant data submitted with a PIX validation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PixPayload {
    /// Merchant UUID, if assigned.
    pub uuid: Option<String>,
    /// Onboarding token, if any.
    pub token: Option<String>,
    /// Soft-deletion marker.
    pub deleted_at: Option<String>,
    /// Upstream merchant id, if assigned.
    pub id: Option<String>,
    /// CPF/CNPJ.
    pub document: String,
    /// Whether the merchant is also switching plans.
    pub switch_plan: bool,
    /// Trade name.
    pub trade_name: String,
    /// Origin system id.
    pub origin_id: String,
    /// Submitted bank account.
    pub bank: PayloadBank,
    /// Submitted fee entries.
    pub fees: Vec<MarketplaceFee>,
}

/// Bank account as submitted in a [`PixPayload`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayloadBank {
    /// Bank name token.
    pub bank_name: String,
    /// Bank code.
    pub bank_number: String,
    /// Branch number.
    pub agency: String,
    /// Account number.
    pub account: String,
    /// Account check digit.
    pub account_digit: String,
    /// PIX key.
    pub pix_key: String,
    /// Holder name.
    pub holder_name: String,
    /// Holder document.
    pub holder_document: String,
    /// PIX key type as sent by the merchant.
    pub pix_key_type: String,
}
