//! Weekend payout ("repasse de fim de semana") eligibility.

use serde::{Deserialize, Serialize};

/// Message the blocklist endpoint returns for a blocklisted merchant.
pub const BLOCKLISTED_MESSAGE: &str = "Marketplace is in the weekend payout blocklist";

/// Body of a 200 response from the weekend payout blocklist endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlocklistEntry {
    /// Server message describing the blocklist membership.
    pub message: String,
}

impl BlocklistEntry {
    /// Parses a response body that is either `{"message": ...}`, a JSON
    /// string, or plain text.
    #[inline]
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        if let Ok(entry) = serde_json::from_str::<Self>(body) {
            return entry;
        }
        let message = serde_json::from_str::<String>(body)
            .unwrap_or_else(|_| body.trim().to_owned());
        Self { message }
    }
}

/// Whether a merchant receives payouts on weekends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeekendPayoutStatus {
    /// Not on the blocklist.
    #[serde(rename = "Recebe")]
    Receives,
    /// On the blocklist.
    #[serde(rename = "Não recebe")]
    DoesNotReceive,
    /// The check failed or returned an unexpected answer.
    #[serde(rename = "Erro ao verificar")]
    Unknown,
}

impl WeekendPayoutStatus {
    /// Derives the status from the blocklist lookup, where `None` means the
    /// endpoint answered 404.
    #[inline]
    #[must_use]
    pub fn from_blocklist(entry: Option<&BlocklistEntry>) -> Self {
        match entry {
            None => Self::Receives,
            Some(found) if found.message == BLOCKLISTED_MESSAGE => Self::DoesNotReceive,
            Some(_) => Self::Unknown,
        }
    }

    /// Returns the label rendered in the status field.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Receives => "Recebe",
            Self::DoesNotReceive => "Não recebe",
            Self::Unknown => "Erro ao verificar",
        }
    }
}

impl core::fmt::Display for WeekendPayoutStatus {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_from_blocklist_receives() {
        assert_eq!(
            WeekendPayoutStatus::from_blocklist(None),
            WeekendPayoutStatus::Receives
        );
        assert_eq!(WeekendPayoutStatus::Receives.to_string(), "Recebe");
    }

    #[test]
    fn exact_message_does_not_receive() {
        let entry = BlocklistEntry {
            message: BLOCKLISTED_MESSAGE.to_owned(),
        };
        assert_eq!(
            WeekendPayoutStatus::from_blocklist(Some(&entry)),
            WeekendPayoutStatus::DoesNotReceive
        );
    }

    #[test]
    fn other_message_is_unknown() {
        let entry = BlocklistEntry {
            message: "marketplace is in the weekend payout blocklist".to_owned(),
        };
        assert_eq!(
            WeekendPayoutStatus::from_blocklist(Some(&entry)),
            WeekendPayoutStatus::Unknown
        );
    }

    #[test]
    fn body_parsing_accepts_object_string_and_text() {
        let object = BlocklistEntry::from_body(r#"{"message":"x"}"#);
        assert_eq!(object.message, "x");
        let string = BlocklistEntry::from_body(r#""y""#);
        assert_eq!(string.message, "y");
        let text = BlocklistEntry::from_body(" z \n");
        assert_eq!(text.message, "z");
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_string(&WeekendPayoutStatus::DoesNotReceive).unwrap();
        assert_eq!(json, r#""Não recebe""#);
    }
}
