//! Locating and normalizing a merchant record in a list response.
//!
//! The merchant listing endpoint answers in one of several shapes: a bare
//! array, an object nesting the array under a conventional key, or a single
//! bare record. [`SHAPE_CHAIN`] tries each shape in order, and within a
//! shape [`PREDICATE_CHAIN`] tries each identifier predicate in order. The
//! first predicate that matches in the first shape that matches wins.
//!
//! The matched record is then decoded leniently (ids may be numbers or
//! strings, flags may be strings) and normalized into a
//! [`MerchantProfile`].

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, YooPayError};
use crate::models::{
    BankDetails, DEFAULT_DRIVER, FeeConfig, FeeType, MISSING_DOCUMENT, MISSING_EMAIL,
    MISSING_NAME, MISSING_PHONE, MerchantId, MerchantProfile, MerchantRecord, PIX_METHOD,
    PixKeyType, bank_by_code, bank_by_name, normalize_bank_name,
};

/// Keys under which list endpoints conventionally nest their records.
pub const NESTED_KEYS: [&str; 4] = ["data", "results", "items", "list"];

/// Fields compared against the identifier when `id` does not match.
pub const ALTERNATE_ID_FIELDS: [&str; 4] = ["originId", "codigo", "document", "documento"];

/// Where the merchant records sit inside a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// The body is the array of records.
    Array,
    /// The body is an object with the array under this key.
    Nested(&'static str),
    /// The body is the record itself.
    Bare,
}

/// Order in which response shapes are tried.
pub const SHAPE_CHAIN: [ResponseShape; 6] = [
    ResponseShape::Array,
    ResponseShape::Nested(NESTED_KEYS[0]),
    ResponseShape::Nested(NESTED_KEYS[1]),
    ResponseShape::Nested(NESTED_KEYS[2]),
    ResponseShape::Nested(NESTED_KEYS[3]),
    ResponseShape::Bare,
];

/// How a record is compared against the requested identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPredicate {
    /// `id` is a string equal to the identifier.
    ExactString,
    /// `id` and the identifier are the same integer.
    Numeric,
    /// One of [`ALTERNATE_ID_FIELDS`] equals the identifier.
    AlternateField,
}

/// Order in which identifier predicates are tried within a shape.
pub const PREDICATE_CHAIN: [IdPredicate; 3] = [
    IdPredicate::ExactString,
    IdPredicate::Numeric,
    IdPredicate::AlternateField,
];

impl IdPredicate {
    /// Returns `true` if `record` is the merchant identified by `id`.
    #[inline]
    #[must_use]
    pub fn matches(self, record: &Value, id: &MerchantId) -> bool {
        let Some(object) = record.as_object() else {
            return false;
        };
        let wanted = id.as_str();
        match self {
            Self::ExactString => object
                .get("id")
                .and_then(Value::as_str)
                .is_some_and(|candidate| candidate == wanted),
            Self::Numeric => {
                let Some(wanted_number) = parse_number(wanted) else {
                    return false;
                };
                object
                    .get("id")
                    .and_then(as_number)
                    .is_some_and(|candidate| (candidate - wanted_number).abs() < f64::EPSILON)
            }
            Self::AlternateField => ALTERNATE_ID_FIELDS.iter().any(|&field| {
                object
                    .get(field)
                    .and_then(loose_text)
                    .is_some_and(|candidate| candidate == wanted)
            }),
        }
    }
}

impl ResponseShape {
    /// Returns the records this shape sees in `body`, or `None` if the body
    /// does not have this shape.
    fn records(self, body: &Value) -> Option<&[Value]> {
        match self {
            Self::Array => body.as_array().map(Vec::as_slice),
            Self::Nested(key) => body
                .as_object()
                .and_then(|object| object.get(key))
                .and_then(Value::as_array)
                .map(Vec::as_slice),
            Self::Bare => body.is_object().then_some(core::slice::from_ref(body)),
        }
    }

    /// Finds the record identified by `id` in `body` using this shape.
    #[inline]
    #[must_use]
    pub fn locate<'body>(self, body: &'body Value, id: &MerchantId) -> Option<&'body Value> {
        let records = self.records(body)?;
        PREDICATE_CHAIN.iter().find_map(|&predicate| {
            records
                .iter()
                .find(|&record| predicate.matches(record, id))
        })
    }
}

/// Finds the record identified by `id`, reporting which shape held it.
#[inline]
#[must_use]
pub fn find_record<'body>(
    body: &'body Value,
    id: &MerchantId,
) -> Option<(ResponseShape, &'body Value)> {
    SHAPE_CHAIN
        .iter()
        .find_map(|&shape| shape.locate(body, id).map(|record| (shape, record)))
}

/// Locates and normalizes the merchant identified by `id`.
///
/// # Errors
///
/// Returns [`YooPayError::NotFound`] if no shape yields a match, or
/// [`YooPayError::Serialization`] if the matched record cannot be decoded.
#[inline]
pub fn resolve(body: &Value, id: &MerchantId) -> Result<MerchantProfile> {
    let (shape, record) =
        find_record(body, id).ok_or_else(|| YooPayError::NotFound(id.to_string()))?;
    tracing::debug!(merchant_id = %id, shape = ?shape, "merchant record located");
    normalize(record, id)
}

/// Normalizes a single raw merchant record.
///
/// # Errors
///
/// Returns [`YooPayError::Serialization`] if a nested structure has an
/// unexpected type (e.g. `bank` is a string).
#[inline]
pub fn normalize(record: &Value, id: &MerchantId) -> Result<MerchantProfile> {
    let raw = RawMerchant::deserialize(record)?;
    Ok(raw.into_profile(id))
}

// ── Lenient decoding ────────────────────────────────────────────────────

/// Parses text as a finite number, so `"123"` and `"123.0"` are equal.
fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Reads a JSON number, or a string holding one, as `f64`.
fn as_number(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(parse_number))
}

/// Reads a JSON value as non-blank text, accepting numbers.
fn loose_text(value: &Value) -> Option<String> {
    if value.is_number() {
        return Some(value.to_string());
    }
    value
        .as_str()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

/// Text field that may arrive as a string, a number or `null`.
#[derive(Debug, Clone, Default)]
struct Loose(Option<String>);

impl<'de> Deserialize<'de> for Loose {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> core::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self(loose_text(&value)))
    }
}

impl Loose {
    /// Returns the text, if any.
    fn get(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Boolean flag that may arrive as a bool, a number or a string.
#[derive(Debug, Clone, Copy, Default)]
struct Flag(bool);

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> core::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let flag = match value {
            Value::Bool(flag) => flag,
            Value::Number(number) => number.as_f64().is_some_and(|n| n.abs() > f64::EPSILON),
            Value::String(text) => matches!(
                text.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "yes" | "active" | "enabled"
            ),
            Value::Null | Value::Array(_) | Value::Object(_) => false,
        };
        Ok(Self(flag))
    }
}

/// Decimal that may arrive as a number or a string (`"2,5"` included).
#[derive(Debug, Clone, Copy, Default)]
struct Amount(Option<f64>);

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> core::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let amount = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().replace(',', ".").parse().ok(),
            Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
        };
        Ok(Self(amount.filter(|n: &f64| n.is_finite())))
    }
}

/// Merchant record as found upstream. Names vary between API revisions,
/// so every known spelling is kept and resolved in [`RawMerchant::into_profile`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawMerchant {
    /// Upstream id.
    id: Loose,
    /// Origin system id.
    origin_id: Loose,
    /// Legacy merchant code.
    codigo: Loose,
    /// Trade name (current API).
    trade_name: Loose,
    /// Business name.
    business_name: Loose,
    /// Legacy name.
    nome: Loose,
    /// Legacy registered name.
    razao_social: Loose,
    /// Legacy trade name.
    nome_fantasia: Loose,
    /// CPF/CNPJ (current API).
    document: Loose,
    /// Legacy CPF/CNPJ.
    documento: Loose,
    /// Legacy CPF/CNPJ.
    cpf_cnpj: Loose,
    /// Contact e-mail.
    email: Loose,
    /// Contact phone.
    phone: Loose,
    /// Legacy phone.
    telefone: Loose,
    /// Legacy mobile phone.
    celular: Loose,
    /// Bank account (current API).
    bank: Option<RawBank>,
    /// Bank account (alternate spelling).
    bank_account: Option<RawBank>,
    /// Legacy bank account.
    dados_bancarios: Option<RawBank>,
    /// Payment drivers and their methods.
    drivers: Option<Vec<RawDriver>>,
}

/// Bank account as found upstream, in English or legacy Portuguese names.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawBank {
    /// Bank name token.
    #[serde(alias = "nomeBanco")]
    bank_name: Loose,
    /// Bank code.
    #[serde(alias = "numeroBanco")]
    bank_number: Loose,
    /// Branch.
    #[serde(alias = "agencia")]
    agency: Loose,
    /// Account number.
    #[serde(alias = "conta")]
    account: Loose,
    /// Account check digit.
    #[serde(alias = "digitoConta")]
    account_digit: Loose,
    /// PIX key.
    #[serde(alias = "chavePix")]
    pix_key: Loose,
    /// PIX key type.
    #[serde(alias = "tipoChave")]
    pix_key_type: Loose,
    /// Holder name.
    #[serde(alias = "nomeBeneficiario")]
    holder_name: Loose,
    /// Holder document.
    #[serde(alias = "documentoBeneficiario")]
    holder_document: Loose,
}

/// Payment driver (acquirer) and the methods it serves.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawDriver {
    /// Driver name.
    name: Loose,
    /// Driver name (alternate key).
    driver: Loose,
    /// Whether the driver is enabled.
    enabled: Flag,
    /// Methods served by the driver.
    methods: Option<Vec<RawMethod>>,
}

/// Payment method entry of a driver.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawMethod {
    /// Method name.
    name: Loose,
    /// Method name (alternate key).
    method: Loose,
    /// Whether the method is enabled.
    enabled: Flag,
    /// Fee per sale.
    fee_value: Amount,
    /// Per-transaction fee.
    transaction_fee_value: Amount,
    /// Fee type.
    fee_type: Loose,
}

/// Returns the first present text among `candidates`.
fn first_text<'raw>(candidates: &[&'raw Loose]) -> Option<&'raw str> {
    candidates.iter().find_map(|loose| loose.get())
}

impl RawDriver {
    /// Returns the driver name, if any.
    fn name(&self) -> Option<&str> {
        first_text(&[&self.name, &self.driver])
    }

    /// Returns the PIX method of this driver, if it has one.
    fn pix_method(&self) -> Option<&RawMethod> {
        self.methods.as_deref()?.iter().find(|method| {
            first_text(&[&method.name, &method.method])
                .is_some_and(|name| name.eq_ignore_ascii_case(PIX_METHOD))
        })
    }
}

/// Derives the PIX fee from the first driver that owns a PIX method.
fn pix_fee(drivers: Option<&[RawDriver]>) -> FeeConfig {
    let Some((driver, method)) = drivers.and_then(|list| {
        list.iter()
            .find_map(|driver| driver.pix_method().map(|method| (driver, method)))
    }) else {
        return FeeConfig::default();
    };
    let fee_type = method
        .fee_type
        .get()
        .and_then(|raw| raw.parse::<FeeType>().ok())
        .unwrap_or_default();
    FeeConfig {
        value: method.fee_value.0.or(method.transaction_fee_value.0),
        fee_type,
        enabled: driver.enabled.0 && method.enabled.0,
        driver: driver
            .name()
            .map_or_else(|| DEFAULT_DRIVER.to_owned(), str::to_ascii_lowercase),
    }
}

impl RawBank {
    /// Normalizes bank name, code and key type.
    fn into_details(self) -> BankDetails {
        let raw_number = self.bank_number.get();
        let bank_name = self.bank_name.get().map(normalize_bank_name).or_else(|| {
            raw_number
                .and_then(bank_by_code)
                .map(|bank| bank.name.to_owned())
        });
        let bank_number = raw_number.map(str::to_owned).or_else(|| {
            bank_name
                .as_deref()
                .and_then(bank_by_name)
                .map(|bank| bank.code.to_owned())
        });
        BankDetails {
            bank_name,
            bank_number,
            agency: text_or_empty(&self.agency),
            account: text_or_empty(&self.account),
            account_digit: text_or_empty(&self.account_digit),
            pix_key: text_or_empty(&self.pix_key),
            pix_key_type: self
                .pix_key_type
                .get()
                .and_then(|raw| raw.parse::<PixKeyType>().ok()),
            holder_name: text_or_empty(&self.holder_name),
            holder_document: text_or_empty(&self.holder_document),
        }
    }
}

/// Returns the text or an empty string.
fn text_or_empty(loose: &Loose) -> String {
    loose.get().unwrap_or_default().to_owned()
}

impl RawMerchant {
    /// Resolves field spellings and placeholders into the view shape.
    fn into_profile(self, requested: &MerchantId) -> MerchantProfile {
        let fee = pix_fee(self.drivers.as_deref());
        let record = MerchantRecord {
            id: first_text(&[&self.id, &self.codigo])
                .unwrap_or_else(|| requested.as_str())
                .to_owned(),
            origin_id: self.origin_id.get().map(str::to_owned),
            name: first_text(&[
                &self.trade_name,
                &self.business_name,
                &self.nome,
                &self.razao_social,
                &self.nome_fantasia,
            ])
            .unwrap_or(MISSING_NAME)
            .to_owned(),
            document: first_text(&[&self.document, &self.documento, &self.cpf_cnpj])
                .unwrap_or(MISSING_DOCUMENT)
                .to_owned(),
            email: self.email.get().unwrap_or(MISSING_EMAIL).to_owned(),
            phone: first_text(&[&self.phone, &self.telefone, &self.celular])
                .unwrap_or(MISSING_PHONE)
                .to_owned(),
        };
        let bank_details = self
            .bank
            .or(self.bank_account)
            .or(self.dados_bancarios)
            .map(RawBank::into_details)
            .unwrap_or_default();
        MerchantProfile {
            record,
            bank_details,
            fee,
        }
    }
}
