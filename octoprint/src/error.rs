/// Errors returned while talking to an OctoPrint server.
///
/// Every call either fully succeeds or fails with exactly one of these; none
/// of them are retried by the client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server answered with an unexpected status code, a malformed
    /// header, or a body that could not be decoded.
    #[error("invalid response from the OctoPrint server")]
    InvalidResponse,

    /// The configured api key was rejected (`403 Forbidden`).
    #[error("the OctoPrint server rejected the api key")]
    InvalidCredentials,

    /// The server refused the submitted command (`400 Bad Request`).
    #[error("the OctoPrint server rejected the request as malformed")]
    BadRequest,

    /// The request never produced a response.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// A request or user token cannot be sent as a single path segment.
    #[error("invalid token {0:?}")]
    InvalidToken(String),

    /// A request url could not be built from the base url.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Result type used throughout this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
