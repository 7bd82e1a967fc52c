//! Message ingest validation.

use super::model::Message;

/// Validation error for an ingested message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Message id is empty.
    EmptyId,
    /// Thread id is empty.
    EmptyThreadId,
    /// Sender address is empty.
    EmptySenderAddress,
    /// No recipients.
    NoRecipients,
    /// A recipient address is empty.
    EmptyRecipientAddress,
    /// Timestamp is missing or not a positive epoch-millisecond value.
    InvalidTimestamp,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyId => "Message id is required",
            Self::EmptyThreadId => "Thread id is required",
            Self::EmptySenderAddress => "Sender address is required",
            Self::NoRecipients => "At least one recipient is required",
            Self::EmptyRecipientAddress => "Recipient address must not be empty",
            Self::InvalidTimestamp => "Timestamp must be a positive epoch-millisecond value",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyId => "id",
            Self::EmptyThreadId => "thread_id",
            Self::EmptySenderAddress => "from",
            Self::NoRecipients | Self::EmptyRecipientAddress => "to",
            Self::InvalidTimestamp => "timestamp",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a message.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate a message before it is persisted.
///
/// Returns `Ok(())` if valid, or `Err(Vec<ValidationError>)` with all errors.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any fields are invalid.
pub fn validate_message(message: &Message) -> ValidationResult {
    let mut errors = Vec::new();

    if message.id.trim().is_empty() {
        errors.push(ValidationError::EmptyId);
    }

    if message.thread_id.trim().is_empty() {
        errors.push(ValidationError::EmptyThreadId);
    }

    if message.from.address.trim().is_empty() {
        errors.push(ValidationError::EmptySenderAddress);
    }

    if message.to.is_empty() {
        errors.push(ValidationError::NoRecipients);
    } else if message.to.iter().any(|r| r.address.trim().is_empty()) {
        errors.push(ValidationError::EmptyRecipientAddress);
    }

    if message.timestamp <= 0 {
        errors.push(ValidationError::InvalidTimestamp);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
