//! Client for the hosted auth backend (GoTrue-compatible REST API).
//!
//! Every request carries the anonymous key in the `apikey` header. Calls
//! made on behalf of a signed-in user additionally send the user's access
//! token as the bearer token.
//!
//! Provides both async and blocking variants behind feature flags.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, YooPayError};
use crate::models::{AuthUser, UserMetadata};

/// Header carrying the anonymous key.
const API_KEY_HEADER: &str = "apikey";

/// Body of password sign-in and sign-up requests.
#[derive(Debug, Serialize)]
struct Credentials<'req> {
    /// Login e-mail.
    email: &'req str,
    /// Plain-text password.
    password: &'req str,
    /// User metadata, only sent on sign-up.
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'req UserMetadata>,
}

/// Body of a password recovery request.
#[derive(Debug, Serialize)]
struct Recovery<'req> {
    /// Account e-mail.
    email: &'req str,
}

/// Rejects blank credentials before any request is made.
fn check_credentials<'req>(email: &'req str, password: &'req str) -> Result<&'req str> {
    let trimmed = email.trim();
    if trimmed.is_empty() || password.is_empty() {
        return Err(YooPayError::Validation("Informe e-mail e senha.".to_owned()));
    }
    Ok(trimmed)
}

/// Extracts the human-readable message from an auth error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["error_description", "msg", "message", "error"]
                .into_iter()
                .find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_owned))
        })
        .unwrap_or_else(|| body.trim().to_owned())
}

/// Maps a non-success auth response to an error.
fn auth_error(status: u16, body: &str) -> YooPayError {
    let message = error_message(body);
    match status {
        400 | 401 | 403 | 422 => YooPayError::Auth(message),
        _ => YooPayError::Api { status, message },
    }
}

/// Reads the user out of a sign-up response, which is either the user
/// itself or a session wrapping it.
fn signed_up_user(body: &str) -> Result<AuthUser> {
    let value: Value = serde_json::from_str(body)?;
    let nested = value.get("user").filter(|inner| inner.is_object()).cloned();
    Ok(serde_json::from_value(nested.unwrap_or(value))?)
}

/// Generates an auth client (async or blocking) with its methods and tests.
macro_rules! define_auth_client {
    (
        client_name: $client:ident,
        http_type: $http_type:ty,
        request_type: $req_type:ty,
        response_type: $resp_type:ty,
        client_doc: $client_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Underlying HTTP client.
            http: $http_type,
            /// Auth backend base URL.
            url: Url,
            /// Anonymous key.
            anon_key: SecretString,
        }

        impl $client {
            /// Creates a client for the backend described by `config`.
            ///
            /// # Errors
            ///
            /// Returns [`YooPayError::Http`] if the HTTP client fails to build.
            #[inline]
            pub fn new(config: &AuthConfig) -> Result<Self> {
                tracing::debug!(url = %config.url, "building auth client");
                Ok(Self {
                    http: <$http_type>::builder().build()?,
                    url: config.url.clone(),
                    anon_key: config.anon_key.clone(),
                })
            }

            /// Signs in with e-mail and password.
            ///
            /// # Errors
            ///
            /// Returns [`YooPayError::Validation`] for blank credentials and
            /// [`YooPayError::Auth`] if the backend rejects them.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
                let login = check_credentials(email, password)?;
                let mut url = endpoint(&self.url, &["auth", "v1", "token"])?;
                url.set_query(Some("grant_type=password"));
                let request = self
                    .request(Method::POST, url, &self.anon_key)
                    .json(&Credentials {
                        email: login,
                        password,
                        data: None,
                    });
                let body = self.send(request) $( .$await_ext )? ?;
                let session: AuthSession = serde_json::from_str(&body)?;
                tracing::debug!(user_id = %session.user.id, "signed in");
                Ok(session)
            }

            /// Registers a new user with `metadata` (role, name, ...).
            ///
            /// # Errors
            ///
            /// Returns [`YooPayError::Validation`] for blank credentials and
            /// [`YooPayError::Auth`] if the backend rejects the sign-up.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn sign_up(
                &self,
                email: &str,
                password: &str,
                metadata: &UserMetadata,
            ) -> Result<AuthUser> {
                let login = check_credentials(email, password)?;
                let url = endpoint(&self.url, &["auth", "v1", "signup"])?;
                let request = self
                    .request(Method::POST, url, &self.anon_key)
                    .json(&Credentials {
                        email: login,
                        password,
                        data: Some(metadata),
                    });
                let body = self.send(request) $( .$await_ext )? ?;
                signed_up_user(&body)
            }

            /// Revokes the session of `access_token`.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the backend refuses it.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn sign_out(&self, access_token: &SecretString) -> Result<()> {
                let url = endpoint(&self.url, &["auth", "v1", "logout"])?;
                let request = self.request(Method::POST, url, access_token);
                let _body = self.send(request) $( .$await_ext )? ?;
                Ok(())
            }

            /// Returns the user owning `access_token`.
            ///
            /// # Errors
            ///
            /// Returns [`YooPayError::Auth`] if the token is no longer valid.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn current_user(&self, access_token: &SecretString) -> Result<AuthUser> {
                let url = endpoint(&self.url, &["auth", "v1", "user"])?;
                let request = self.request(Method::GET, url, access_token);
                let body = self.send(request) $( .$await_ext )? ?;
                Ok(serde_json::from_str(&body)?)
            }

            /// Sends a password reset e-mail, optionally linking back to
            /// `redirect_to`.
            ///
            /// # Errors
            ///
            /// Returns [`YooPayError::Validation`] for a blank e-mail, or an
            /// error if the backend refuses the request.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn reset_password(
                &self,
                email: &str,
                redirect_to: Option<&str>,
            ) -> Result<()> {
                let trimmed = email.trim();
                if trimmed.is_empty() {
                    return Err(YooPayError::Validation("Informe o e-mail.".to_owned()));
                }
                let mut url = endpoint(&self.url, &["auth", "v1", "recover"])?;
                if let Some(target) = redirect_to {
                    let mut pairs = url.query_pairs_mut();
                    let _pairs = pairs.append_pair("redirect_to", target);
                }
                let request = self
                    .request(Method::POST, url, &self.anon_key)
                    .json(&Recovery { email: trimmed });
                let _body = self.send(request) $( .$await_ext )? ?;
                Ok(())
            }

            /// Prepares a request carrying the anonymous key, authorized by
            /// `bearer` (the anonymous key itself or a user access token).
            fn request(&self, method: Method, url: Url, bearer: &SecretString) -> $req_type {
                tracing::trace!(method = %method, url = %url, "sending auth request");
                self.http
                    .request(method, url)
                    .header(API_KEY_HEADER, self.anon_key.expose_secret())
                    .bearer_auth(bearer.expose_secret())
            }

            /// Sends a request and returns the body of a success response.
            $($async_kw)? fn send(&self, request: $req_type) -> Result<String> {
                let response: $resp_type = request.send() $( .$await_ext )? ?;
                let status = response.status();
                tracing::debug!(status = %status, "received auth response");
                if status.is_success() {
                    Ok(response.text() $( .$await_ext )? ?)
                } else {
                    let body = response
                        .text()
                        $( .$await_ext )?
                        .unwrap_or_default();
                    Err(auth_error(status.as_u16(), &body))
                }
            }
        }
    };
}

#[cfg(feature = "async")]
mod async_auth {
    //! Async auth client.

    use reqwest::Method;
    use secrecy::{ExposeSecret as _, SecretString};
    use url::Url;

    use super::{
        API_KEY_HEADER, Credentials, Recovery, auth_error, check_credentials, signed_up_user,
    };
    use crate::client::endpoint;
    use crate::config::AuthConfig;
    use crate::error::{Result, YooPayError};
    use crate::models::{AuthSession, AuthUser, UserMetadata};

    define_auth_client! {
        client_name: AuthClient,
        http_type: reqwest::Client,
        request_type: reqwest::RequestBuilder,
        response_type: reqwest::Response,
        client_doc: "Async client for the auth backend.",
        async_kw: async,
        await_kw: await,
    }
}

#[cfg(feature = "blocking")]
mod blocking_auth {
    //! Blocking (synchronous) auth client.

    use reqwest::Method;
    use secrecy::{ExposeSecret as _, SecretString};
    use url::Url;

    use super::{
        API_KEY_HEADER, Credentials, Recovery, auth_error, check_credentials, signed_up_user,
    };
    use crate::client::endpoint;
    use crate::config::AuthConfig;
    use crate::error::{Result, YooPayError};
    use crate::models::{AuthSession, AuthUser, UserMetadata};

    define_auth_client! {
        client_name: AuthBlockingClient,
        http_type: reqwest::blocking::Client,
        request_type: reqwest::blocking::RequestBuilder,
        response_type: reqwest::blocking::Response,
        client_doc: "Blocking (synchronous) client for the auth backend.",
    }
}

#[cfg(feature = "async")]
pub use async_auth::AuthClient;
#[cfg(feature = "blocking")]
pub use blocking_auth::AuthBlockingClient;
