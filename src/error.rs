//! Domain errors for remote calls and the flows built on top of them.
//!
//! Application plumbing (terminal, config, command spawning) keeps using
//! `color_eyre::Result`. Anything a page shows to the user as the result of
//! a remote flow is an [`Error`], so the page can tell a transport failure
//! from a missing input or an exhausted retry loop.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The remote service could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// The remote service answered with a non-2xx status.
    #[error("Request failed with status code {status}: {message}")]
    Http { status: u16, message: String },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Invalid response from server: {0}")]
    Decode(String),

    /// Missing or malformed local input, or input the remote rejected.
    #[error("{0}")]
    Validation(String),

    /// A precondition of a flow did not hold (e.g. no users to post as).
    #[error("{0}")]
    Logic(String),

    /// The retrying fetcher ran out of attempts.
    #[error("Fetch failed after {attempts} attempts: {last}")]
    RetryExhausted { attempts: u32, last: Box<Error> },
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn logic(message: impl Into<String>) -> Self {
        Self::Logic(message.into())
    }

    /// Whether trying the same request again could succeed.
    ///
    /// Local validation and flow preconditions are never retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Http { .. } | Self::Decode(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(Error::Network("connection refused".into()).is_retryable());
        assert!(
            Error::Http {
                status: 503,
                message: "unavailable".into()
            }
            .is_retryable()
        );
        assert!(Error::Decode("missing field `id`".into()).is_retryable());

        assert!(!Error::validation("Post ID is required.").is_retryable());
        assert!(!Error::logic("No users available to create a post.").is_retryable());
        assert!(
            !Error::RetryExhausted {
                attempts: 4,
                last: Box::new(Error::Network("down".into())),
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(
            Error::validation("User ID is required to create a post.").to_string(),
            "User ID is required to create a post."
        );

        let exhausted = Error::RetryExhausted {
            attempts: 4,
            last: Box::new(Error::Http {
                status: 500,
                message: "boom".into(),
            }),
        };
        assert_eq!(
            exhausted.to_string(),
            "Fetch failed after 4 attempts: Request failed with status code 500: boom"
        );
    }
}
