//! Identity provider error types.

use thiserror::Error;

/// Errors that can occur talking to the identity provider.
///
/// `Rejected` displays the provider's message unmodified so it can be shown
/// to the user as-is.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider answered with an error body.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request never got an answer.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// An auth endpoint URL could not be built.
    #[error("invalid identity provider URL: {0}")]
    Url(#[from] url::ParseError),

    /// The provider answered with an unexpected body.
    #[error("unexpected response from identity provider: {0}")]
    Decode(String),
}
