//! Staff users, auth sessions and user metadata.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, YooPayError};
use crate::roles::Role;

/// The signed-in staff member, as persisted in the local session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffUser {
    /// Login e-mail.
    pub email: String,
    /// Access role.
    pub role: Role,
    /// Display name.
    pub name: String,
    /// When the session was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_in_at: Option<DateTime<Utc>>,
}

impl StaffUser {
    /// Returns `true` if every required field is filled in.
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.name.trim().is_empty()
    }

    /// Builds the staff user from an authenticated user.
    ///
    /// The display name falls back to the local part of the e-mail.
    ///
    /// # Errors
    ///
    /// Returns [`YooPayError::Auth`] if the user has no (known) role.
    #[inline]
    pub fn from_auth_user(user: &AuthUser) -> Result<Self> {
        let role = user
            .user_metadata
            .role
            .as_deref()
            .ok_or_else(|| YooPayError::Auth("Usuário sem perfil de acesso.".to_owned()))?
            .parse::<Role>()
            .map_err(|err| YooPayError::Auth(err.to_string()))?;
        let name = user
            .user_metadata
            .full_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| {
                user.email
                    .split('@')
                    .next()
                    .unwrap_or_default()
                    .to_owned()
            });
        Ok(Self {
            email: user.email.clone(),
            role,
            name,
            signed_in_at: Some(Utc::now()),
        })
    }
}

/// Free-form metadata attached to an auth user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    /// Full name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Back-office role name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Any other metadata keys.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// User object returned by the auth backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Auth user id.
    pub id: String,
    /// Login e-mail.
    #[serde(default)]
    pub email: String,
    /// User metadata, including the role.
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Session returned by a password sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    /// Bearer access token.
    #[serde(deserialize_with = "secret_string")]
    pub access_token: SecretString,
    /// Refresh token.
    #[serde(deserialize_with = "secret_string")]
    pub refresh_token: SecretString,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: i64,
    /// Token type (normally `bearer`).
    #[serde(default)]
    pub token_type: String,
    /// The authenticated user.
    pub user: AuthUser,
}

/// Deserializes a string straight into a [`SecretString`].
fn secret_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> core::result::Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret as _;

    use super::*;

    fn auth_user(role: Option<&str>, full_name: Option<&str>) -> AuthUser {
        AuthUser {
            id: "u-1".to_owned(),
            email: "ana@yooga.com.br".to_owned(),
            user_metadata: UserMetadata {
                full_name: full_name.map(str::to_owned),
                role: role.map(str::to_owned),
                ..UserMetadata::default()
            },
        }
    }

    #[test]
    fn staff_user_from_auth_user() {
        let user =
            StaffUser::from_auth_user(&auth_user(Some("supervisor"), Some("Ana Lima"))).unwrap();
        assert_eq!(user.role, Role::Supervisor);
        assert_eq!(user.name, "Ana Lima");
        assert!(user.signed_in_at.is_some());
        assert!(user.is_complete());
    }

    #[test]
    fn staff_user_name_falls_back_to_email() {
        let user = StaffUser::from_auth_user(&auth_user(Some("financeiro"), None)).unwrap();
        assert_eq!(user.name, "ana");
    }

    #[test]
    fn staff_user_requires_known_role() {
        assert!(matches!(
            StaffUser::from_auth_user(&auth_user(None, None)),
            Err(YooPayError::Auth(_))
        ));
        assert!(StaffUser::from_auth_user(&auth_user(Some("root"), None)).is_err());
    }

    #[test]
    fn metadata_keeps_unknown_keys() {
        let json = r#"{"full_name":"Ana","role":"pagamento","team":"ops"}"#;
        let metadata: UserMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.role.as_deref(), Some("pagamento"));
        assert_eq!(metadata.extra["team"], "ops");
    }

    #[test]
    fn session_deserializes_secret_tokens() {
        let json = r#"{
            "access_token": "at",
            "refresh_token": "refresh-secret-xyz",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": {"id": "u-1", "email": "a@b.com", "user_metadata": {"role": "supervisor"}}
        }"#;
        let session: AuthSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.access_token.expose_secret(), "at");
        assert!(!format!("{session:?}").contains("refresh-secret-xyz"));
    }
}
