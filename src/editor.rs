//! Editable copy of a merchant's bank details.
//!
//! [`BankDetailsEditor`] holds the server state of the last lookup and a
//! draft the operator edits. Saving is done by
//! [`BackOffice::save_bank_details`](crate::back_office::BackOffice::save_bank_details),
//! which sends [`BankDetailsEditor::to_request`] and reloads the editor from
//! a fresh lookup.

use crate::error::{Result, YooPayError};
use crate::models::{
    BankDetails, BankingRequest, MerchantId, MerchantProfile, PixKeyType, bank_by_name,
};

/// Bank selection meaning "none of the listed banks".
pub const UNLISTED_BANK: &str = "Outro (não listado)";

/// A free-text field of the bank details form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BankField {
    /// Branch number.
    Agency,
    /// Account number.
    Account,
    /// Single-character account check digit.
    AccountDigit,
    /// PIX key.
    PixKey,
    /// Account holder name.
    HolderName,
    /// Account holder CPF/CNPJ.
    HolderDocument,
}

/// Bank details form state for one merchant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankDetailsEditor {
    /// Merchant the details belong to.
    merchant_id: MerchantId,
    /// Details as last returned by the server.
    saved: BankDetails,
    /// Details as currently edited.
    draft: BankDetails,
}

impl BankDetailsEditor {
    /// Creates an editor whose draft starts as a copy of `saved`.
    #[inline]
    #[must_use]
    pub fn new(merchant_id: MerchantId, saved: BankDetails) -> Self {
        Self {
            merchant_id,
            draft: saved.clone(),
            saved,
        }
    }

    /// Creates an editor for the merchant returned by a lookup.
    #[inline]
    #[must_use]
    pub fn from_profile(merchant_id: MerchantId, profile: &MerchantProfile) -> Self {
        Self::new(merchant_id, profile.bank_details.clone())
    }

    /// Returns the merchant being edited.
    #[inline]
    #[must_use]
    pub const fn merchant_id(&self) -> &MerchantId {
        &self.merchant_id
    }

    /// Returns the details as last returned by the server.
    #[inline]
    #[must_use]
    pub const fn saved(&self) -> &BankDetails {
        &self.saved
    }

    /// Returns the details as currently edited.
    #[inline]
    #[must_use]
    pub const fn draft(&self) -> &BankDetails {
        &self.draft
    }

    /// Sets a free-text field of the draft.
    ///
    /// # Errors
    ///
    /// Returns [`YooPayError::Validation`] if the account digit is longer
    /// than one character.
    #[inline]
    pub fn set<T: Into<String>>(&mut self, field: BankField, raw: T) -> Result<()> {
        let value: String = raw.into();
        let slot = match field {
            BankField::Agency => &mut self.draft.agency,
            BankField::Account => &mut self.draft.account,
            BankField::AccountDigit => {
                if value.trim().chars().count() > 1 {
                    return Err(YooPayError::Validation(
                        "O dígito da conta deve ter apenas um caractere.".to_owned(),
                    ));
                }
                &mut self.draft.account_digit
            }
            BankField::PixKey => &mut self.draft.pix_key,
            BankField::HolderName => &mut self.draft.holder_name,
            BankField::HolderDocument => &mut self.draft.holder_document,
        };
        *slot = value.trim().to_owned();
        Ok(())
    }

    /// Sets the selected PIX key type.
    #[inline]
    pub const fn set_pix_key_type(&mut self, key_type: Option<PixKeyType>) {
        self.draft.pix_key_type = key_type;
    }

    /// Selects a bank by display name.
    ///
    /// A catalogue bank fills in its code; [`UNLISTED_BANK`] clears both
    /// name and code.
    ///
    /// # Errors
    ///
    /// Returns [`YooPayError::Validation`] if the name is neither a
    /// catalogue bank nor [`UNLISTED_BANK`].
    #[inline]
    pub fn select_bank(&mut self, name: &str) -> Result<()> {
        if name.trim() == UNLISTED_BANK {
            self.draft.bank_name = None;
            self.draft.bank_number = None;
            return Ok(());
        }
        let bank = bank_by_name(name).ok_or_else(|| {
            YooPayError::Validation(format!("banco desconhecido: {}", name.trim()))
        })?;
        self.draft.bank_name = Some(bank.name.to_owned());
        self.draft.bank_number = Some(bank.code.to_owned());
        Ok(())
    }

    /// Returns the key type that will be sent, after the phone-prefix rule.
    #[inline]
    #[must_use]
    pub fn effective_pix_key_type(&self) -> Option<PixKeyType> {
        PixKeyType::effective(self.draft.pix_key_type, &self.draft.pix_key)
    }

    /// Returns `true` if the draft differs from the saved details.
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.draft != self.saved
    }

    /// Throws away the draft and starts over from the saved details.
    #[inline]
    pub fn discard_changes(&mut self) {
        self.draft.clone_from(&self.saved);
    }

    /// Replaces both saved details and draft with fresh server state.
    #[inline]
    pub fn reload(&mut self, profile: &MerchantProfile) {
        self.saved.clone_from(&profile.bank_details);
        self.draft.clone_from(&profile.bank_details);
    }

    /// Builds the request body for the current draft.
    #[inline]
    #[must_use]
    pub fn to_request(&self) -> BankingRequest {
        BankingRequest {
            bank_name: self.draft.bank_name.clone(),
            bank_number: self.draft.bank_number.clone(),
            agency: self.draft.agency.clone(),
            account: self.draft.account.clone(),
            account_digit: self.draft.account_digit.clone(),
            pix_key: self.draft.pix_key.clone(),
            pix_key_type: self.effective_pix_key_type(),
            holder_name: self.draft.holder_name.clone(),
            holder_document: self.draft.holder_document.clone(),
            user_idi: self.merchant_id.to_idi(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::Idi;

    fn editor() -> BankDetailsEditor {
        BankDetailsEditor::new(
            MerchantId::parse("123").unwrap(),
            BankDetails {
                bank_name: Some("Nubank".to_owned()),
                bank_number: Some("260".to_owned()),
                pix_key: "ana@example.com".to_owned(),
                pix_key_type: Some(PixKeyType::Email),
                ..BankDetails::default()
            },
        )
    }

    #[test]
    fn phone_prefix_overrides_selected_type() {
        let mut editor = editor();
        editor.set(BankField::PixKey, "+5511999990000").unwrap();
        editor.set_pix_key_type(Some(PixKeyType::Cpf));
        assert_eq!(editor.to_request().pix_key_type, Some(PixKeyType::Phone));
    }

    #[test]
    fn selected_type_kept_without_phone_prefix() {
        let mut editor = editor();
        editor.set_pix_key_type(Some(PixKeyType::Random));
        assert_eq!(editor.to_request().pix_key_type, Some(PixKeyType::Random));
    }

    #[test]
    fn unlisted_bank_sends_nulls() {
        let mut editor = editor();
        editor.select_bank(UNLISTED_BANK).unwrap();
        let body = serde_json::to_value(editor.to_request()).unwrap();
        assert_eq!(body["bankName"], json!(null));
        assert_eq!(body["bankNumber"], json!(null));
    }

    #[test]
    fn listed_bank_fills_code() {
        let mut editor = editor();
        editor.select_bank("banco inter").unwrap();
        assert_eq!(editor.draft().bank_name.as_deref(), Some("Banco Inter"));
        assert_eq!(editor.draft().bank_number.as_deref(), Some("077"));
        assert!(editor.select_bank("Banco Imaginário").is_err());
    }

    #[test]
    fn request_carries_user_idi() {
        let request = editor().to_request();
        assert_eq!(request.user_idi, Idi::Numeric(123));
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["userIdi"], json!(123));
        assert_eq!(body["pixKeyType"], json!("EMAIL"));
    }

    #[test]
    fn account_digit_is_single_character() {
        let mut editor = editor();
        assert!(editor.set(BankField::AccountDigit, "12").is_err());
        editor.set(BankField::AccountDigit, " 7 ").unwrap();
        assert_eq!(editor.draft().account_digit, "7");
    }

    #[test]
    fn dirty_tracking_and_discard() {
        let mut editor = editor();
        assert!(!editor.is_dirty());
        editor.set(BankField::Agency, "0001").unwrap();
        assert!(editor.is_dirty());
        editor.discard_changes();
        assert!(!editor.is_dirty());
        assert_eq!(editor.draft(), editor.saved());
    }

    #[test]
    fn reload_replaces_saved_state() {
        let mut editor = editor();
        editor.set(BankField::Account, "999").unwrap();
        let profile = MerchantProfile {
            record: crate::models::MerchantRecord {
                id: "123".to_owned(),
                origin_id: None,
                name: "Acme".to_owned(),
                document: String::new(),
                email: String::new(),
                phone: String::new(),
            },
            bank_details: BankDetails {
                account: "555".to_owned(),
                ..BankDetails::default()
            },
            fee: crate::models::FeeConfig::default(),
        };
        editor.reload(&profile);
        assert_eq!(editor.saved().account, "555");
        assert!(!editor.is_dirty());
    }
}
