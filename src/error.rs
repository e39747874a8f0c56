//! Error taxonomy for the engine.
//!
//! Three families matter to callers: authentication errors (surfaced inline,
//! never fatal), provider/mutation errors (logged, local state untouched),
//! and the subscription-blocked state (global, clears only when the backend
//! reports the subscription active again). Provider errors are converted at
//! the call site and never escape into the navigation machine.

use thiserror::Error;

/// Authentication failures. Always recoverable; control returns to the
/// screen the user was on with an inline message.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The backend returned a role string the normalization table does not
    /// know. Treated as unauthorized rather than guessing a role.
    #[error("unrecognized role: {0}")]
    UnknownRole(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Failures talking to the external backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if e.is_decode() {
            ProviderError::Decode(e.to_string())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

/// Failures of entity save/delete/toggle operations. Local state is left
/// unchanged; updates are only applied after the provider round-trip
/// completes.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("subscription blocked, complete payment to continue")]
    SubscriptionBlocked,

    #[error("{entity} rejected by backend: {message}")]
    Rejected { entity: &'static str, message: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
