//! PIX fee configuration and the marketplace fee request body.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Idi;
use crate::error::YooPayError;

/// Payment driver used when the merchant record names none. PIX is always
/// disabled on this driver.
pub const DEFAULT_DRIVER: &str = "itau";

/// Method name of the PIX rail inside `drivers[].methods[]`.
pub const PIX_METHOD: &str = "PIX";

/// How a fee is charged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeType {
    /// Percentage of each sale.
    #[default]
    #[serde(alias = "percentage", alias = "porcentagem")]
    Percentage,
    /// Fixed amount (BRL) per sale.
    #[serde(alias = "fixed", alias = "fixo")]
    Fixed,
}

impl FromStr for FeeType {
    type Err = YooPayError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentage" | "porcentagem" | "percent" | "%" => Ok(Self::Percentage),
            "fixed" | "fixo" | "amount" => Ok(Self::Fixed),
            other => Err(YooPayError::Validation(format!(
                "tipo de taxa desconhecido: {other}"
            ))),
        }
    }
}

/// PIX fee of a merchant as shown in the fee panel (`configTaxa`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Fee amount; a percentage or a BRL value depending on `fee_type`.
    #[serde(rename = "valor")]
    pub value: Option<f64>,
    /// How the fee is charged.
    #[serde(rename = "tipo")]
    pub fee_type: FeeType,
    /// Whether PIX is active for this merchant.
    #[serde(rename = "ativo")]
    pub enabled: bool,
    /// Payment driver that owns the PIX method.
    pub driver: String,
}

impl Default for FeeConfig {
    #[inline]
    fn default() -> Self {
        Self {
            value: None,
            fee_type: FeeType::Percentage,
            enabled: false,
            driver: DEFAULT_DRIVER.to_owned(),
        }
    }
}

impl FeeConfig {
    /// Returns the human-readable preview of the fee, if a value is set.
    #[inline]
    #[must_use]
    pub fn preview(&self) -> Option<String> {
        self.value.map(|value| fee_preview(value, self.fee_type))
    }
}

/// Formats a fee the way the fee panel previews it.
#[inline]
#[must_use]
pub fn fee_preview(value: f64, fee_type: FeeType) -> String {
    match fee_type {
        FeeType::Percentage => format!("{value}% sobre cada venda"),
        FeeType::Fixed => format!("R$ {value:.2} por venda"),
    }
}

/// One entry of `marketplaceFees` in the fee request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketplaceFee {
    /// Payment driver (e.g. `itau`).
    pub driver: String,
    /// Payment method (e.g. `PIX`).
    pub method: String,
    /// Fee charged per sale.
    pub fee_value: f64,
    /// How `fee_value` is charged.
    pub fee_type: FeeType,
    /// Additional per-transaction fee.
    pub transaction_fee_value: f64,
    /// How `transaction_fee_value` is charged.
    pub transaction_fee_type: FeeType,
}

impl MarketplaceFee {
    /// Builds the PIX fee entry for `driver`.
    ///
    /// The whole fee goes into `feeValue`; the per-transaction fee is
    /// always a fixed zero.
    #[inline]
    #[must_use]
    pub fn pix(driver: &str, value: f64, fee_type: FeeType) -> Self {
        Self {
            driver: driver.to_owned(),
            method: PIX_METHOD.to_owned(),
            fee_value: value,
            fee_type,
            transaction_fee_value: 0.0,
            transaction_fee_type: FeeType::Fixed,
        }
    }
}

/// Request body for `POST /payments/marketplace/fees`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceFeesRequest {
    /// Merchant the fees belong to.
    pub idi: Idi,
    /// Fee entries to activate.
    pub marketplace_fees: Vec<MarketplaceFee>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fee_is_disabled_without_value() {
        let fee = FeeConfig::default();
        assert!(!fee.enabled);
        assert!(fee.value.is_none());
        assert_eq!(fee.driver, DEFAULT_DRIVER);
        assert!(fee.preview().is_none());
    }

    #[test]
    fn preview_formats_by_type() {
        assert_eq!(fee_preview(2.5, FeeType::Percentage), "2.5% sobre cada venda");
        assert_eq!(fee_preview(10.0, FeeType::Fixed), "R$ 10.00 por venda");
    }

    #[test]
    fn fee_type_parses_portuguese_and_english() {
        assert_eq!("porcentagem".parse::<FeeType>().unwrap(), FeeType::Percentage);
        assert_eq!("FIXED".parse::<FeeType>().unwrap(), FeeType::Fixed);
        assert_eq!("fixo".parse::<FeeType>().unwrap(), FeeType::Fixed);
        assert!("monthly".parse::<FeeType>().is_err());
    }

    #[test]
    fn pix_fee_body_shape() {
        let request = MarketplaceFeesRequest {
            idi: Idi::Numeric(123),
            marketplace_fees: vec![MarketplaceFee::pix("itau", 2.5, FeeType::Percentage)],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "idi": 123,
                "marketplaceFees": [{
                    "driver": "itau",
                    "method": "PIX",
                    "feeValue": 2.5,
                    "feeType": "PERCENTAGE",
                    "transactionFeeValue": 0.0,
                    "transactionFeeType": "FIXED"
                }]
            })
        );
    }
}
