//! Bank details, PIX key types and the bank catalogue.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Idi;
use crate::error::YooPayError;

/// Prefix that marks a PIX key as a phone number (`+55` country code).
pub const PHONE_KEY_PREFIX: &str = "+55";

/// Kind of PIX key (account alias).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixKeyType {
    /// Individual taxpayer number.
    #[serde(rename = "CPF", alias = "cpf")]
    Cpf,
    /// Company taxpayer number.
    #[serde(rename = "CNPJ", alias = "cnpj")]
    Cnpj,
    /// E-mail address.
    #[serde(rename = "EMAIL", alias = "email", alias = "e-mail")]
    Email,
    /// Mobile phone number.
    #[serde(rename = "PHONE", alias = "phone", alias = "telefone")]
    Phone,
    /// Random key issued by the bank.
    #[serde(rename = "RANDOM", alias = "random", alias = "aleatoria", alias = "EVP", alias = "evp")]
    Random,
}

impl PixKeyType {
    /// Returns the label shown in the key type selector.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cpf => "CPF",
            Self::Cnpj => "CNPJ",
            Self::Email => "E-mail",
            Self::Phone => "Telefone",
            Self::Random => "Chave Aleatória",
        }
    }

    /// Resolves the key type that is actually sent for `key`.
    ///
    /// A key starting with [`PHONE_KEY_PREFIX`] is always a phone key,
    /// whatever was selected.
    #[inline]
    #[must_use]
    pub fn effective(selected: Option<Self>, key: &str) -> Option<Self> {
        if key.trim_start().starts_with(PHONE_KEY_PREFIX) {
            Some(Self::Phone)
        } else {
            selected
        }
    }
}

impl FromStr for PixKeyType {
    type Err = YooPayError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpf" => Ok(Self::Cpf),
            "cnpj" => Ok(Self::Cnpj),
            "email" | "e-mail" => Ok(Self::Email),
            "phone" | "telefone" | "celular" => Ok(Self::Phone),
            "random" | "aleatoria" | "evp" | "chave aleatoria" => Ok(Self::Random),
            other => Err(YooPayError::Validation(format!(
                "tipo de chave PIX desconhecido: {other}"
            ))),
        }
    }
}

/// Normalized bank account and PIX key of a merchant.
///
/// Field names follow the back-office view state (`dadosBancarios`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    /// Display name of the bank, `None` when not on the catalogue.
    #[serde(rename = "nomeBanco")]
    pub bank_name: Option<String>,
    /// COMPE bank code.
    #[serde(rename = "numeroBanco")]
    pub bank_number: Option<String>,
    /// Branch number.
    #[serde(rename = "agencia")]
    pub agency: String,
    /// Account number without the check digit.
    #[serde(rename = "conta")]
    pub account: String,
    /// Account check digit.
    #[serde(rename = "digitoConta")]
    pub account_digit: String,
    /// PIX key.
    #[serde(rename = "chavePix")]
    pub pix_key: String,
    /// PIX key type, if known.
    #[serde(rename = "tipoChave")]
    pub pix_key_type: Option<PixKeyType>,
    /// Account holder name.
    #[serde(rename = "nomeBeneficiario")]
    pub holder_name: String,
    /// Account holder CPF/CNPJ.
    #[serde(rename = "documentoBeneficiario")]
    pub holder_document: String,
}

/// Request body for `POST /payments/banking`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankingRequest {
    /// Bank display name, `null` for an unlisted bank.
    pub bank_name: Option<String>,
    /// Bank code, `null` for an unlisted bank.
    pub bank_number: Option<String>,
    /// Branch number.
    pub agency: String,
    /// Account number.
    pub account: String,
    /// Account check digit.
    pub account_digit: String,
    /// PIX key.
    pub pix_key: String,
    /// PIX key type after the phone-prefix rule.
    pub pix_key_type: Option<PixKeyType>,
    /// Account holder name.
    pub holder_name: String,
    /// Account holder document.
    pub holder_document: String,
    /// Merchant the details belong to.
    pub user_idi: Idi,
}

/// A bank the back-office knows by name and code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankInfo {
    /// Display name.
    pub name: &'static str,
    /// COMPE code.
    pub code: &'static str,
    /// Upstream name tokens that map to this bank.
    pub tokens: &'static [&'static str],
}

/// Banks selectable in the editor, with their upstream name tokens.
pub const BANKS: &[BankInfo] = &[
    BankInfo {
        name: "Banco do Brasil",
        code: "001",
        tokens: &["BANCO_DO_BRASIL", "BB"],
    },
    BankInfo {
        name: "Caixa Econômica Federal",
        code: "104",
        tokens: &["CAIXA", "CEF"],
    },
    BankInfo {
        name: "Bradesco",
        code: "237",
        tokens: &["BRADESCO"],
    },
    BankInfo {
        name: "Itaú Unibanco",
        code: "341",
        tokens: &["ITAU", "ITAU_UNIBANCO"],
    },
    BankInfo {
        name: "Santander",
        code: "033",
        tokens: &["SANTANDER"],
    },
    BankInfo {
        name: "Banco Original",
        code: "212",
        tokens: &["ORIGINAL", "BANCO_ORIGINAL"],
    },
    BankInfo {
        name: "Nubank",
        code: "260",
        tokens: &["NUBANK", "NU_PAGAMENTOS"],
    },
    BankInfo {
        name: "PagSeguro Internet",
        code: "290",
        tokens: &["PAGSEGURO", "PAGBANK"],
    },
    BankInfo {
        name: "Mercado Pago",
        code: "323",
        tokens: &["MERCADO_PAGO", "MERCADOPAGO"],
    },
    BankInfo {
        name: "Banco Inter",
        code: "077",
        tokens: &["INTER", "BANCO_INTER"],
    },
    BankInfo {
        name: "C6 Bank",
        code: "336",
        tokens: &["C6", "C6_BANK"],
    },
];

/// Maps an upstream bank token (e.g. `"NUBANK"`) to its display name.
///
/// Unknown tokens are returned unchanged (trimmed).
#[inline]
#[must_use]
pub fn normalize_bank_name(raw: &str) -> String {
    let token: String = raw
        .trim()
        .chars()
        .map(|ch| match ch {
            ' ' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect();
    BANKS
        .iter()
        .find(|bank| bank.tokens.contains(&token.as_str()))
        .map_or_else(|| raw.trim().to_owned(), |bank| bank.name.to_owned())
}

/// Finds a catalogue bank by its display name (case-insensitive).
#[inline]
#[must_use]
pub fn bank_by_name(name: &str) -> Option<&'static BankInfo> {
    let wanted = name.trim();
    BANKS
        .iter()
        .find(|bank| bank.name.eq_ignore_ascii_case(wanted))
}

/// Finds a catalogue bank by its COMPE code.
#[inline]
#[must_use]
pub fn bank_by_code(code: &str) -> Option<&'static BankInfo> {
    let wanted = code.trim();
    BANKS.iter().find(|bank| bank.code == wanted)
}
