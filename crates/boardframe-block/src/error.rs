/// Errors that can occur while decoding blocks or building frame URLs.
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    /// The `data` value is not valid JSON. The raw string is kept.
    #[error("invalid data JSON ({raw:?}): {source}")]
    InvalidData {
        raw: String,
        source: serde_json::Error,
    },

    /// A parameter key contains characters outside `[A-Za-z0-9_]`.
    #[error("invalid parameter key {0:?}")]
    InvalidKey(String),

    /// The configured endpoint cannot be parsed as a URL.
    #[error("invalid frame endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        source: url::ParseError,
    },

    /// The host product token cannot be turned into a version pattern.
    #[error("invalid host product token: {0}")]
    InvalidProduct(String),

    /// Identifier length must be at least one.
    #[error("identifier length must be greater than zero")]
    InvalidIdLength,
}

pub type Result<T> = std::result::Result<T, BlockError>;
