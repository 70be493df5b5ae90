use reqwest::StatusCode;

/// The error type for the Consul client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configured address could not be turned into a URL.
    #[error("Invalid store address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: url::ParseError,
    },
    /// The configured address is a URL that cannot carry a path.
    #[error("Store address {0:?} cannot be used as a base URL")]
    NotABaseUrl(String),
    /// The HTTP request could not be sent or its response could not be read.
    #[error("Request error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Got a non-success status code.
    #[error("Got an error response ({status}): {message}")]
    Response { status: StatusCode, message: String },
    /// The store answered the write with `false`.
    #[error("Store refused to write {0}")]
    Rejected(String),
}

/// Alias for a `Result` that defaults to [`Error`] as the error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;
