use thiserror::Error;

/// An argument failed validation before it could reach an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArgumentError {
    /// The string is not a valid aggregate identity.
    #[error("Malformed aggregate id: {value:?}")]
    MalformedId { value: String },

    /// Surrogate ids are non-negative.
    #[error("Surrogate id must be non-negative, got {value}")]
    NegativeSurrogate { value: i64 },

    /// The login does not satisfy the login format.
    #[error("Invalid login {value:?}: {reason}")]
    InvalidLogin { value: String, reason: &'static str },

    /// The password does not satisfy the minimum strength.
    #[error("Password must be at least {min_length} characters")]
    WeakPassword { min_length: usize },
}
