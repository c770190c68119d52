//! Data models for the Yooga Pay back-office.
//!
//! This module contains the normalized view types produced by the merchant
//! lookup, the request bodies sent to the payment APIs, newtype ID wrappers
//! and the auth/session user types.

mod bank;
mod fee;
mod ids;
mod merchant;
mod payout;
mod user;
mod validation;

pub use bank::{
    BANKS, BankDetails, BankInfo, BankingRequest, PHONE_KEY_PREFIX, PixKeyType, bank_by_code,
    bank_by_name, normalize_bank_name,
};
pub use fee::{
    DEFAULT_DRIVER, FeeConfig, FeeType, MarketplaceFee, MarketplaceFeesRequest, PIX_METHOD,
    fee_preview,
};
pub use ids::{Idi, MerchantId, ValidationRequestId};
pub use merchant::{
    MISSING_DOCUMENT, MISSING_EMAIL, MISSING_NAME, MISSING_PHONE, MerchantProfile, MerchantRecord,
};
pub use payout::{BLOCKLISTED_MESSAGE, BlocklistEntry, WeekendPayoutStatus};
pub use user::{AuthSession, AuthUser, StaffUser, UserMetadata};
pub use validation::{PayloadBank, PixPayload, PixValidationRequest};
