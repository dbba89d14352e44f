//! Error type returned by the request executor
//!
//! Login failures are wrapped with a message naming the credentials step.
//! Request assembly and transport failures are passed through unchanged so
//! callers see the underlying `url`, `http` or `ureq` error as-is.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    /// The login collaborator rejected the credentials or could not be reached
    #[error("error in login with user provided credentials: {source}")]
    Login {
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    InvalidRequest(#[from] ureq::http::Error),

    #[error(transparent)]
    Http(#[from] ureq::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// The worker running the blocking call exited without a result
    #[error("request worker stopped without a result")]
    WorkerStopped,
}

impl RequestError {
    /// Wrap a login collaborator failure
    pub fn login(source: impl Into<anyhow::Error>) -> Self {
        Self::Login {
            source: source.into(),
        }
    }

    /// True for errors caused by the request context rather than the peer
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
