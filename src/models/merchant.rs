//! Normalized merchant record and lookup result.

use serde::{Deserialize, Serialize};

use super::{BankDetails, FeeConfig};

/// Placeholder name used when the record carries none.
pub const MISSING_NAME: &str = "Nome não informado";
/// Placeholder document used when the record carries none.
pub const MISSING_DOCUMENT: &str = "Documento não informado";
/// Placeholder e-mail used when the record carries none.
pub const MISSING_EMAIL: &str = "E-mail não informado";
/// Placeholder phone used when the record carries none.
pub const MISSING_PHONE: &str = "Telefone não informado";

/// Identity of a merchant as returned by the lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantRecord {
    /// Upstream merchant id.
    pub id: String,
    /// Origin system id, when the record has one.
    #[serde(rename = "originId")]
    pub origin_id: Option<String>,
    /// Trade or business name.
    #[serde(rename = "nome")]
    pub name: String,
    /// CPF/CNPJ.
    #[serde(rename = "documento")]
    pub document: String,
    /// Contact e-mail.
    pub email: String,
    /// Contact phone.
    #[serde(rename = "telefone")]
    pub phone: String,
}

/// Everything the merchant registration screen needs after a lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantProfile {
    /// Merchant identity.
    #[serde(flatten)]
    pub record: MerchantRecord,
    /// Bank account and PIX key.
    #[serde(rename = "dadosBancarios")]
    pub bank_details: BankDetails,
    /// PIX fee configuration.
    #[serde(rename = "configTaxa")]
    pub fee: FeeConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_serializes_view_field_names() {
        let profile = MerchantProfile {
            record: MerchantRecord {
                id: "123".to_owned(),
                origin_id: None,
                name: "Acme".to_owned(),
                document: MISSING_DOCUMENT.to_owned(),
                email: MISSING_EMAIL.to_owned(),
                phone: MISSING_PHONE.to_owned(),
            },
            bank_details: BankDetails {
                bank_name: Some("Nubank".to_owned()),
                ..BankDetails::default()
            },
            fee: FeeConfig::default(),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["nome"], "Acme");
        assert_eq!(json["id"], "123");
        assert_eq!(json["dadosBancarios"]["nomeBanco"], "Nubank");
        assert_eq!(json["configTaxa"]["ativo"], false);
    }
}
