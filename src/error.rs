//! Error types for the proxy-link-verifier crate.

use thiserror::Error;

/// Reason a share-link could not be turned into a descriptor.
///
/// Parse failures are never fatal: the pipeline drops the offending link and
/// keeps going.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The link is not a syntactically valid URI.
    #[error("invalid share-link URI: {0}")]
    InvalidUri(#[from] url::ParseError),
    /// The URI parsed but carries no host.
    #[error("share-link has no host")]
    MissingHost,
    /// The link does not start with the expected scheme prefix.
    #[error("unrecognized link scheme")]
    UnrecognizedScheme,
    /// The base64 payload could not be decoded.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The decoded payload is not valid UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// The embedded vmess JSON object could not be deserialized.
    #[error("invalid embedded JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A shadowsocks link is missing the mandatory `#` remark separator.
    #[error("shadowsocks link missing '#' remark separator")]
    MissingRemark,
    /// A shadowsocks body did not split into method, password and endpoint.
    #[error("malformed shadowsocks credentials")]
    MalformedCredentials,
}

/// Reason a descriptor could not be rendered into a client configuration.
///
/// Rendering failures classify the descriptor as not working without
/// aborting the run.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The descriptor carries no server address.
    #[error("descriptor has no server address")]
    MissingAddress,
    /// The port field is absent or not an integer in 0-65535.
    #[error("invalid server port {0:?}")]
    InvalidPort(String),
    /// The alterId field is not an integer.
    #[error("invalid alterId {0:?}")]
    InvalidAlterId(String),
}
