use thiserror::Error;

/// Error types for the Finnhub integration
#[derive(Error, Debug)]
pub enum FinnhubError {
    /// The upstream answered the key probe with 401
    #[error("The API key you entered is invalid or has expired. Please try again.")]
    InvalidKey,

    /// A data method was called before `ready` initialized the upstream handle
    #[error("Finnhub client is not ready; no validated API key has been set")]
    NotReady,

    /// Transport-level failure talking to the upstream.
    /// The request URL is stripped since it carries the API key.
    #[error("Finnhub request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// The upstream answered with a non-success status
    #[error("Finnhub API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The upstream body did not have the expected shape
    #[error("Failed to parse Finnhub response: {0}")]
    Decode(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A bulk download named an exchange that was never imported
    #[error("Exchange '{0}' is not a supported exchange; import exchanges first")]
    UnknownExchange(String),
}

impl From<reqwest::Error> for FinnhubError {
    fn from(error: reqwest::Error) -> Self {
        FinnhubError::Http(error.without_url())
    }
}

/// Type alias for Result with FinnhubError
pub type Result<T> = std::result::Result<T, FinnhubError>;
