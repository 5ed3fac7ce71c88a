//! Error types for jianjia.

use thiserror::Error;

/// Main error type for all binding-layer operations.
#[derive(Debug, Error)]
pub enum JianjiaError {
    /// I/O error while reading or writing a body.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// URL could not be parsed or resolved.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Client or service configuration is invalid (base URL, duplicate methods, ...).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A declared method failed validation.
    #[error("{reason}\n    for method {service}.{method}")]
    Method {
        /// Service the method belongs to.
        service: String,
        /// Method name.
        method: String,
        /// What is wrong with the declaration.
        reason: String,
    },

    /// No converter or call adapter in the chain accepted the type.
    #[error("{0}")]
    Resolution(String),

    /// The service has no method with this name.
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Runtime arguments disagree with the method descriptor.
    #[error("Argument error: {0}")]
    Argument(String),

    /// The caller asked for a different return type than the method declares.
    #[error("Return type mismatch: method declares {declared}, caller requested {requested}")]
    ReturnTypeMismatch {
        /// Declared return type.
        declared: &'static str,
        /// Requested return type.
        requested: &'static str,
    },

    /// Network-level failure reported by the transport.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Body could not be converted to or from the declared type.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Non-2xx response surfaced by an adapter that only yields bodies.
    #[error("HTTP {code} {message}")]
    Http {
        /// Status code.
        code: u16,
        /// Reason phrase.
        message: String,
    },

    /// A call can only be executed once; clone it to retry.
    #[error("Already executed")]
    AlreadyExecuted,
}

impl JianjiaError {
    /// Wrap any transport failure.
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        JianjiaError::Transport(err.into())
    }

    pub(crate) fn method(service: &str, method: &str, reason: impl Into<String>) -> Self {
        JianjiaError::Method {
            service: service.to_string(),
            method: method.to_string(),
            reason: reason.into(),
        }
    }

    /// Declaration or client setup problem; fixing the code is the only remedy.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            JianjiaError::Config(_) | JianjiaError::Method { .. } | JianjiaError::Resolution(_)
        )
    }

    /// Failure while talking to the server.
    pub fn is_transport(&self) -> bool {
        matches!(self, JianjiaError::Transport(_) | JianjiaError::Io(_))
    }

    /// Malformed payload in either direction.
    pub fn is_conversion(&self) -> bool {
        matches!(
            self,
            JianjiaError::Conversion(_)
                | JianjiaError::Json(_)
                | JianjiaError::MsgPackEncode(_)
                | JianjiaError::MsgPackDecode(_)
        )
    }

    /// Caller misuse detected at invocation time.
    pub fn is_programmer(&self) -> bool {
        matches!(
            self,
            JianjiaError::Argument(_)
                | JianjiaError::UnknownMethod(_)
                | JianjiaError::ReturnTypeMismatch { .. }
                | JianjiaError::AlreadyExecuted
        )
    }
}

/// Result type alias using JianjiaError.
pub type Result<T> = std::result::Result<T, JianjiaError>;
