//! Request failures and their JSON-RPC error codes.

use hledger_loader::LoadError;
use lsp_server::ErrorCode;
use thiserror::Error;

/// Why a request could not be answered.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request parameters did not deserialize.
    #[error("invalid params: {0}")]
    InvalidParams(#[source] serde_json::Error),

    /// The document URI does not name a local file.
    #[error("unsupported document URI: {0}")]
    UnsupportedUri(String),

    /// Loading the journal or one of its includes failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The response could not be serialized.
    #[error("failed to serialize response: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl RequestError {
    /// The JSON-RPC error code reported to the client.
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidParams(_) | Self::UnsupportedUri(_) => ErrorCode::InvalidParams,
            Self::Load(LoadError::Cancelled) => ErrorCode::ContentModified,
            Self::Load(_) | Self::Serialize(_) => ErrorCode::InternalError,
        }
    }
}
