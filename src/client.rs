//! HTTP client for the Yooga Pay APIs.
//!
//! Merchant reads, driver toggles and PIX validation review go to the
//! payment API; fee and banking writes go to the second host ("api4").
//! Each host has its own bearer token.
//!
//! Provides both async and blocking client variants behind feature flags.

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{DEFAULT_API4_URL, DEFAULT_PAYMENT_API_URL};
use crate::error::{Result, YooPayError};

/// API host a request is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Host {
    /// `payment.yooga.com.br`.
    Payment,
    /// `api4.yooga.com.br`.
    Api4,
}

/// Appends path segments to `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| YooPayError::Config(format!("{base} cannot be a base URL")))?;
        let _path = path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

/// Parses a JSON response body.
fn json_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    tracing::trace!(body_len = body.len(), "parsing response body");
    serde_json::from_str(body).map_err(YooPayError::from)
}

/// Generates a Yooga Pay client (async or blocking) with builder, methods,
/// and tests.
macro_rules! define_client {
    (
        client_name: $client:ident,
        builder_name: $builder:ident,
        http_type: $http_type:ty,
        request_type: $req_type:ty,
        response_type: $resp_type:ty,
        client_doc: $client_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug, Default)]
        pub struct $builder {
            /// Payment API base URL override.
            payment_url: Option<String>,
            /// api4 base URL override.
            api4_url: Option<String>,
            /// Payment API bearer token.
            payment_token: Option<SecretString>,
            /// api4 bearer token.
            api4_token: Option<SecretString>,
        }

        impl $builder {
            /// Overrides the payment API base URL (useful for testing with a
            /// mock server).
            #[inline]
            #[must_use]
            pub fn payment_url<T: Into<String>>(mut self, url: T) -> Self {
                self.payment_url = Some(url.into());
                self
            }

            /// Overrides the api4 base URL.
            #[inline]
            #[must_use]
            pub fn api4_url<T: Into<String>>(mut self, url: T) -> Self {
                self.api4_url = Some(url.into());
                self
            }

            /// Sets the payment API bearer token.
            #[inline]
            #[must_use]
            pub fn payment_token<T: Into<String>>(mut self, token: T) -> Self {
                self.payment_token = Some(SecretString::from(token.into()));
                self
            }

            /// Sets the api4 bearer token.
            #[inline]
            #[must_use]
            pub fn api4_token<T: Into<String>>(mut self, token: T) -> Self {
                self.api4_token = Some(SecretString::from(token.into()));
                self
            }

            /// Takes URLs and tokens from `config`.
            #[inline]
            #[must_use]
            pub fn from_config(config: &ApiConfig) -> Self {
                Self {
                    payment_url: Some(config.payment_url.to_string()),
                    api4_url: Some(config.api4_url.to_string()),
                    payment_token: Some(config.payment_token.clone()),
                    api4_token: Some(config.api4_token.clone()),
                }
            }

            /// Builds the client.
            ///
            /// # Errors
            ///
            /// Returns [`YooPayError::Config`] if a token is missing or a URL
            /// is malformed.
            /// Returns [`YooPayError::Http`] if the HTTP client fails to build.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn build(self) -> Result<$client> {
                let payment_token = self
                    .payment_token
                    .ok_or_else(|| YooPayError::Config("payment API token is not set".to_owned()))?;
                let api4_token = self
                    .api4_token
                    .ok_or_else(|| YooPayError::Config("api4 token is not set".to_owned()))?;
                let payment_url = parse_url(
                    "payment API URL",
                    self.payment_url.as_deref().unwrap_or(DEFAULT_PAYMENT_API_URL),
                )?;
                let api4_url = parse_url(
                    "api4 URL",
                    self.api4_url.as_deref().unwrap_or(DEFAULT_API4_URL),
                )?;
                tracing::debug!(payment_url = %payment_url, api4_url = %api4_url, "building client");
                let http = <$http_type>::builder().build()?;

                Ok($client {
                    http,
                    payment_url,
                    payment_token,
                    api4_url,
                    api4_token,
                })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Underlying HTTP client.
            http: $http_type,
            /// Payment API base URL.
            payment_url: Url,
            /// Payment API bearer token.
            payment_token: SecretString,
            /// api4 base URL.
            api4_url: Url,
            /// api4 bearer token.
            api4_token: SecretString,
        }

        impl $client {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub fn builder() -> $builder {
                $builder::default()
            }

            /// Fetches the marketplace list for a merchant
            /// (`GET /marketplace/{id}/list`).
            ///
            /// The body is returned as raw JSON; its shape varies and is
            /// resolved by [`lookup::resolve`](crate::lookup::resolve).
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the body is not JSON.
            #[inline]
            #[tracing::instrument(skip_all, fields(merchant_id = %id))]
            pub $($async_kw)? fn marketplace_list(&self, id: &MerchantId) -> Result<Value> {
                let request =
                    self.request(Host::Payment, Method::GET, &["marketplace", id.as_str(), "list"])?;
                let body = self.send(request) $( .$await_ext )? ?;
                json_body(&body)
            }

            /// Disables the PIX method of `driver` for a merchant
            /// (`POST /marketplace/{id}/drivers/{driver}/disable`).
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status.
            #[inline]
            #[tracing::instrument(skip_all, fields(merchant_id = %id, driver = %driver))]
            pub $($async_kw)? fn disable_driver(&self, id: &MerchantId, driver: &str) -> Result<()> {
                let request = self.request(
                    Host::Payment,
                    Method::POST,
                    &["marketplace", id.as_str(), "drivers", driver, "disable"],
                )?;
                let _body = self.send(request) $( .$await_ext )? ?;
                Ok(())
            }

            /// Looks a merchant up in the weekend payout blocklist
            /// (`GET /marketplace/config/weekend-payout-blocklist/{id}`).
            ///
            /// Returns `None` when the server answers 404, i.e. the merchant is
            /// not blocklisted.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status other than 404.
            #[inline]
            #[tracing::instrument(skip_all, fields(merchant_id = %id))]
            pub $($async_kw)? fn weekend_payout_blocklist(
                &self,
                id: &MerchantId,
            ) -> Result<Option<BlocklistEntry>> {
                let request = self.request(
                    Host::Payment,
                    Method::GET,
                    &["marketplace", "config", "weekend-payout-blocklist", id.as_str()],
                )?;
                match self.send(request) $( .$await_ext )? {
                    Ok(body) => Ok(Some(BlocklistEntry::from_body(&body))),
                    Err(err) if err.is_not_found_status() => Ok(None),
                    Err(err) => Err(err),
                }
            }

            /// Activates marketplace fees (`POST /payments/marketplace/fees`
            /// on api4).
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn submit_marketplace_fees(
                &self,
                request_body: &MarketplaceFeesRequest,
            ) -> Result<()> {
                let request = self
                    .request(Host::Api4, Method::POST, &["payments", "marketplace", "fees"])?
                    .json(request_body);
                let _body = self.send(request) $( .$await_ext )? ?;
                Ok(())
            }

            /// Saves a merchant's bank details (`POST /payments/banking` on
            /// api4).
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn save_banking(&self, request_body: &BankingRequest) -> Result<()> {
                let request = self
                    .request(Host::Api4, Method::POST, &["payments", "banking"])?
                    .json(request_body);
                let _body = self.send(request) $( .$await_ext )? ?;
                Ok(())
            }

            /// Lists PIX validation requests waiting for review
            /// (`GET /marketplace/validation/pending`).
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails, the server returns a
            /// non-success status, or the body cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn pending_validations(&self) -> Result<Vec<PixValidationRequest>> {
                let request = self.request(
                    Host::Payment,
                    Method::GET,
                    &["marketplace", "validation", "pending"],
                )?;
                let body = self.send(request) $( .$await_ext )? ?;
                json_body(&body)
            }

            /// Approves a PIX validation request
            /// (`GET /marketplace/validation/approve/{id}`).
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status.
            #[inline]
            #[tracing::instrument(skip_all, fields(request_id = %id))]
            pub $($async_kw)? fn approve_validation(&self, id: ValidationRequestId) -> Result<()> {
                let id_segment = id.to_string();
                let request = self.request(
                    Host::Payment,
                    Method::GET,
                    &["marketplace", "validation", "approve", &id_segment],
                )?;
                let _body = self.send(request) $( .$await_ext )? ?;
                Ok(())
            }

            /// Rejects a PIX validation request
            /// (`GET /marketplace/validation/pending/delete/{id}`).
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the server returns
            /// a non-success status.
            #[inline]
            #[tracing::instrument(skip_all, fields(request_id = %id))]
            pub $($async_kw)? fn reject_validation(&self, id: ValidationRequestId) -> Result<()> {
                let id_segment = id.to_string();
                let request = self.request(
                    Host::Payment,
                    Method::GET,
                    &["marketplace", "validation", "pending", "delete", &id_segment],
                )?;
                let _body = self.send(request) $( .$await_ext )? ?;
                Ok(())
            }

            /// Prepares an authenticated request to `host`.
            fn request(&self, host: Host, method: Method, segments: &[&str]) -> Result<$req_type> {
                let (base, token) = match host {
                    Host::Payment => (&self.payment_url, &self.payment_token),
                    Host::Api4 => (&self.api4_url, &self.api4_token),
                };
                let url = endpoint(base, segments)?;
                tracing::trace!(method = %method, url = %url, "sending request");
                Ok(self
                    .http
                    .request(method, url)
                    .bearer_auth(token.expose_secret()))
            }

            /// Sends a request and returns the body of a success response.
            $($async_kw)? fn send(&self, request: $req_type) -> Result<String> {
                let response: $resp_type = request.send() $( .$await_ext )? ?;

                let status = response.status();
                tracing::debug!(status = %status, "received response");
                if status.is_success() {
                    Ok(response.text() $( .$await_ext )? ?)
                } else {
                    let message = response
                        .text()
                        $( .$await_ext )?
                        .unwrap_or_else(|_| "unknown error".to_owned());
                    tracing::debug!(status = status.as_u16(), message = %message, "API error");
                    Err(YooPayError::Api {
                        status: status.as_u16(),
                        message,
                    })
                }
            }
        }

        #[cfg(test)]
        mod tests {
            use secrecy::ExposeSecret as _;

            use super::*;

            #[test]
            fn builder_requires_tokens() {
                let result = $client::builder().payment_token("pay").build();
                assert!(matches!(result, Err(YooPayError::Config(_))));
                let result = $client::builder().api4_token("api4").build();
                assert!(matches!(result, Err(YooPayError::Config(_))));
            }

            #[test]
            fn builder_uses_default_hosts() {
                let client = $client::builder()
                    .payment_token("pay")
                    .api4_token("api4")
                    .build()
                    .unwrap();
                assert_eq!(client.payment_url.as_str(), "https://payment.yooga.com.br/");
                assert_eq!(client.api4_url.as_str(), "https://api4.yooga.com.br/");
            }

            #[test]
            fn builder_rejects_malformed_url() {
                let result = $client::builder()
                    .payment_token("pay")
                    .api4_token("api4")
                    .api4_url("not a url")
                    .build();
                assert!(matches!(result, Err(YooPayError::Config(_))));
            }

            #[test]
            fn builder_from_config() {
                let config = ApiConfig {
                    payment_url: Url::parse("http://localhost:8080").unwrap(),
                    payment_token: SecretString::from("pay"),
                    api4_url: Url::parse("http://localhost:8081").unwrap(),
                    api4_token: SecretString::from("api4"),
                };
                let client = $builder::from_config(&config).build().unwrap();
                assert_eq!(client.payment_url.port(), Some(8080));
                assert_eq!(client.api4_token.expose_secret(), "api4");
            }
        }
    };
}

#[cfg(feature = "async")]
mod async_client {
    //! Async HTTP client for the Yooga Pay APIs.

    use reqwest::Method;
    use secrecy::{ExposeSecret as _, SecretString};
    use serde_json::Value;
    use url::Url;

    use super::{DEFAULT_API4_URL, DEFAULT_PAYMENT_API_URL, Host, endpoint, json_body};
    use crate::config::{ApiConfig, parse_url};
    use crate::error::{Result, YooPayError};
    use crate::models::{
        BankingRequest, BlocklistEntry, MarketplaceFeesRequest, MerchantId, PixValidationRequest,
        ValidationRequestId,
    };

    define_client! {
        client_name: YooPayClient,
        builder_name: YooPayClientBuilder,
        http_type: reqwest::Client,
        request_type: reqwest::RequestBuilder,
        response_type: reqwest::Response,
        client_doc: "Async client for the Yooga Pay APIs.\n\nUse [`YooPayClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`YooPayClient`].",
        async_kw: async,
        await_kw: await,
    }
}

#[cfg(feature = "blocking")]
mod blocking_client {
    //! Blocking (synchronous) HTTP client for the Yooga Pay APIs.

    use reqwest::Method;
    use secrecy::{ExposeSecret as _, SecretString};
    use serde_json::Value;
    use url::Url;

    use super::{DEFAULT_API4_URL, DEFAULT_PAYMENT_API_URL, Host, endpoint, json_body};
    use crate::config::{ApiConfig, parse_url};
    use crate::error::{Result, YooPayError};
    use crate::models::{
        BankingRequest, BlocklistEntry, MarketplaceFeesRequest, MerchantId, PixValidationRequest,
        ValidationRequestId,
    };

    define_client! {
        client_name: YooPayBlockingClient,
        builder_name: YooPayBlockingClientBuilder,
        http_type: reqwest::blocking::Client,
        request_type: reqwest::blocking::RequestBuilder,
        response_type: reqwest::blocking::Response,
        client_doc: "Blocking (synchronous) client for the Yooga Pay APIs.\n\nUse [`YooPayBlockingClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`YooPayBlockingClient`].",
    }
}

#[cfg(feature = "async")]
pub use async_client::{YooPayClient, YooPayClientBuilder};
#[cfg(feature = "blocking")]
pub use blocking_client::{YooPayBlockingClient, YooPayBlockingClientBuilder};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_segments() {
        let base = Url::parse("https://payment.yooga.com.br").unwrap();
        let url = endpoint(&base, &["marketplace", "123", "list"]).unwrap();
        assert_eq!(url.as_str(), "https://payment.yooga.com.br/marketplace/123/list");
    }

    #[test]
    fn endpoint_keeps_base_path_and_encodes() {
        let base = Url::parse("http://localhost:9000/api/").unwrap();
        let url = endpoint(&base, &["marketplace", "a/b c", "list"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/api/marketplace/a%2Fb%20c/list");
    }

    #[test]
    fn endpoint_rejects_non_base_url() {
        let base = Url::parse("mailto:ops@yooga.com.br").unwrap();
        assert!(endpoint(&base, &["x"]).is_err());
    }
}
