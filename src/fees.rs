//! PIX fee panel state machine.
//!
//! The panel is either [`FeeState::Disabled`] or [`FeeState::Enabled`].
//! Transitions only happen after the server confirmed them: the
//! [`BackOffice`](crate::back_office::BackOffice) sends the request built
//! here and then calls the matching `confirm_*` method.

use crate::error::{Result, YooPayError};
use crate::models::{
    DEFAULT_DRIVER, FeeConfig, FeeType, MarketplaceFee, MarketplaceFeesRequest, MerchantId,
    MerchantProfile, fee_preview,
};

/// Whether PIX is active for the merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeState {
    /// PIX is off.
    Disabled,
    /// PIX is on with the stored fee.
    Enabled,
}

/// Fee panel of one merchant.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeConfigurationManager {
    /// Merchant the fee belongs to.
    merchant_id: MerchantId,
    /// Current state.
    state: FeeState,
    /// Fee as last confirmed by the server.
    current: FeeConfig,
    /// Value typed into the panel.
    value: Option<f64>,
    /// Type selected in the panel.
    fee_type: FeeType,
}

/// Parses a fee amount typed by an operator (`"2.5"` or `"2,5"`).
///
/// # Errors
///
/// Returns [`YooPayError::Validation`] if the text is not a finite,
/// non-negative number.
#[inline]
pub fn parse_fee_value(raw: &str) -> Result<f64> {
    let normalized = raw.trim().replace(',', ".");
    let invalid = || YooPayError::Validation(format!("valor de taxa inválido: {}", raw.trim()));
    let value: f64 = normalized.parse().map_err(|_err| invalid())?;
    if !value.is_finite() || value.is_sign_negative() {
        return Err(invalid());
    }
    Ok(value)
}

impl FeeConfigurationManager {
    /// Derives the panel from a lookup result.
    #[inline]
    #[must_use]
    pub fn from_profile(merchant_id: MerchantId, profile: &MerchantProfile) -> Self {
        Self::new(merchant_id, profile.fee.clone())
    }

    /// Creates the panel for `fee`.
    #[inline]
    #[must_use]
    pub fn new(merchant_id: MerchantId, fee: FeeConfig) -> Self {
        Self {
            merchant_id,
            state: if fee.enabled {
                FeeState::Enabled
            } else {
                FeeState::Disabled
            },
            value: fee.value,
            fee_type: fee.fee_type,
            current: fee,
        }
    }

    /// Returns the merchant the panel belongs to.
    #[inline]
    #[must_use]
    pub const fn merchant_id(&self) -> &MerchantId {
        &self.merchant_id
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> FeeState {
        self.state
    }

    /// Returns the fee as last confirmed by the server.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> &FeeConfig {
        &self.current
    }

    /// Sets the fee value from operator input.
    ///
    /// # Errors
    ///
    /// See [`parse_fee_value`].
    #[inline]
    pub fn set_value(&mut self, raw: &str) -> Result<()> {
        self.value = Some(parse_fee_value(raw)?);
        Ok(())
    }

    /// Selects the fee type.
    #[inline]
    pub const fn set_fee_type(&mut self, fee_type: FeeType) {
        self.fee_type = fee_type;
    }

    /// Returns the preview of the fee being edited, if a value is set.
    #[inline]
    #[must_use]
    pub fn preview(&self) -> Option<String> {
        self.value.map(|value| fee_preview(value, self.fee_type))
    }

    /// Builds the request that enables PIX with the edited fee.
    ///
    /// Allowed from either state; from `Enabled` it resubmits the fee.
    ///
    /// # Errors
    ///
    /// Returns [`YooPayError::Validation`] if no value has been set.
    #[inline]
    pub fn enable_request(&self) -> Result<MarketplaceFeesRequest> {
        let value = self
            .value
            .ok_or_else(|| YooPayError::Validation("Informe o valor da taxa.".to_owned()))?;
        Ok(MarketplaceFeesRequest {
            idi: self.merchant_id.to_idi(),
            marketplace_fees: vec![MarketplaceFee::pix(
                &self.current.driver,
                value,
                self.fee_type,
            )],
        })
    }

    /// Returns the driver a disable call targets.
    ///
    /// PIX is always disabled on [`DEFAULT_DRIVER`], whichever driver
    /// carries the PIX method in the lookup data.
    ///
    /// # Errors
    ///
    /// Returns [`YooPayError::Validation`] if PIX is already disabled.
    #[inline]
    pub fn disable_target(&self) -> Result<&'static str> {
        match self.state {
            FeeState::Enabled => Ok(DEFAULT_DRIVER),
            FeeState::Disabled => Err(YooPayError::Validation(
                "A taxa PIX já está desativada.".to_owned(),
            )),
        }
    }

    /// Records a successful enable of `request`.
    pub(crate) fn confirm_enabled(&mut self, request: &MarketplaceFeesRequest) {
        if let Some(fee) = request.marketplace_fees.first() {
            self.current.value = Some(fee.fee_value);
            self.current.fee_type = fee.fee_type;
            self.value = Some(fee.fee_value);
            self.fee_type = fee.fee_type;
        }
        self.current.enabled = true;
        self.state = FeeState::Enabled;
    }

    /// Records a successful disable.
    pub(crate) const fn confirm_disabled(&mut self) {
        self.current.enabled = false;
        self.state = FeeState::Disabled;
    }
}
