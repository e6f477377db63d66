//! Error taxonomy for transfer operations.

use thiserror::Error;

use crate::domain::foundation::TransferId;

/// Errors surfaced by the transfer lifecycle operations.
///
/// Validation and limit errors are detected before any state mutation.
/// A provider error leaves the local `created` row behind with no
/// compensating rollback.
#[derive(Debug, Clone, Error)]
pub enum TransferError {
    #[error("Field '{field}' is invalid: {reason}")]
    Validation { field: String, reason: String },

    #[error("Amount {amount_cents} cents exceeds the {limit_cents} cent ceiling")]
    LimitExceeded { amount_cents: i64, limit_cents: i64 },

    #[error("Provider call failed: {0}")]
    Provider(String),

    #[error("Transfer {0} not found")]
    NotFound(TransferId),

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransferError {
    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TransferError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a provider failure error.
    pub fn provider(message: impl Into<String>) -> Self {
        TransferError::Provider(message.into())
    }

    /// Creates an internal (storage/unexpected) error.
    pub fn internal(message: impl Into<String>) -> Self {
        TransferError::Internal(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_the_field() {
        let err = TransferError::validation("recipientEmail", "cannot be empty");
        assert_eq!(
            err.to_string(),
            "Field 'recipientEmail' is invalid: cannot be empty"
        );
    }

    #[test]
    fn limit_error_reports_both_amounts() {
        let err = TransferError::LimitExceeded {
            amount_cents: 2_500_001,
            limit_cents: 2_500_000,
        };
        assert!(err.to_string().contains("2500001"));
        assert!(err.to_string().contains("2500000"));
    }
}
