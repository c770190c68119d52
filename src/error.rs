//! Error types for the Yooga Pay client library.

/// All errors that can occur when using the Yooga Pay client.
#[derive(Debug, thiserror::Error)]
pub enum YooPayError {
    /// User input was rejected before any request was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// No merchant record matched the requested identifier.
    #[error("merchant not found: {0}")]
    NotFound(String),

    /// The HTTP transport failed (connection, TLS, body read).
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, or a placeholder if it could not be read.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Required configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Session store backend failed.
    #[error("session storage error: {0}")]
    Storage(Box<dyn core::error::Error + Send + Sync>),

    /// Writing bank details was rejected or could not be sent.
    #[error("failed to save bank details: {0}")]
    SaveFailed(Box<YooPayError>),

    /// The same action is already waiting for a response.
    #[error("{0} is already in progress")]
    Busy(&'static str),

    /// The auth backend refused the operation.
    #[error("authentication error: {0}")]
    Auth(String),
}

impl YooPayError {
    /// Returns the short message shown to back-office staff.
    ///
    /// Transport and server details are logged by the client, not shown.
    #[inline]
    #[must_use]
    #[allow(
        clippy::pattern_type_mismatch,
        reason = "message fields are borrowed out of &self"
    )]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Auth(message) => message.clone(),
            Self::NotFound(_) => "Cliente não encontrado na base de dados".to_owned(),
            Self::SaveFailed(_) => "Erro ao salvar as informações.".to_owned(),
            Self::Busy(_) => "Aguarde a conclusão da operação em andamento.".to_owned(),
            Self::Config(_) => "Configuração da aplicação incompleta.".to_owned(),
            Self::Storage(_) => "Erro ao acessar a sessão local.".to_owned(),
            #[cfg(any(feature = "async", feature = "blocking"))]
            Self::Http(_) => "Erro de conectividade. Tente novamente.".to_owned(),
            Self::Api { .. } | Self::Serialization(_) => {
                "Erro na comunicação com a API.".to_owned()
            }
        }
    }

    /// Returns `true` if the error came from a 404 response.
    #[inline]
    #[must_use]
    pub const fn is_not_found_status(&self) -> bool {
        matches!(*self, Self::Api { status: 404, .. })
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, YooPayError>;
