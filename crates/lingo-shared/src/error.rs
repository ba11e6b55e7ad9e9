use thiserror::Error;

/// Rejection reasons for a message payload, checked before any write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The message carries no identifier.
    #[error("message id must not be empty")]
    MissingId,

    /// The message body is empty.
    #[error("message text must not be empty")]
    EmptyText,
}
