//! Transfer status state machine.
//!
//! A transfer starts as `created`, becomes `submitted` once the provider
//! accepts it, and then moves through intermediate statuses (`pending`,
//! `sent`) toward a terminal one (`deposited`, `failed`) as webhook events
//! arrive. Provider statuses outside the known set are carried through as
//! `Unrecognized` rather than rejected, so new provider statuses are recorded
//! instead of dropped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// Local record exists, provider not yet called (or the call failed).
    Created,

    /// Provider accepted the submission without reporting a status.
    Submitted,

    /// Provider is processing the transfer.
    Pending,

    /// Funds were sent to the recipient.
    Sent,

    /// Funds were deposited. Terminal.
    Deposited,

    /// Transfer failed. Terminal.
    Failed,

    /// Provider reported a status outside the known set; stored verbatim.
    #[serde(untagged)]
    Unrecognized(String),
}

impl TransferStatus {
    /// Whether no further transition is expected under normal operation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Deposited | TransferStatus::Failed)
    }

    /// Wire representation used in storage and API responses.
    pub fn as_str(&self) -> &str {
        match self {
            TransferStatus::Created => "created",
            TransferStatus::Submitted => "submitted",
            TransferStatus::Pending => "pending",
            TransferStatus::Sent => "sent",
            TransferStatus::Deposited => "deposited",
            TransferStatus::Failed => "failed",
            TransferStatus::Unrecognized(s) => s,
        }
    }

    /// Parses a stored status string back into the enum.
    ///
    /// Values outside the known set become `Unrecognized`, mirroring how they
    /// were admitted in the first place.
    pub fn parse(s: &str) -> Self {
        match s {
            "created" => TransferStatus::Created,
            "submitted" => TransferStatus::Submitted,
            "pending" => TransferStatus::Pending,
            "sent" => TransferStatus::Sent,
            "deposited" => TransferStatus::Deposited,
            "failed" => TransferStatus::Failed,
            other => TransferStatus::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maps a raw provider status onto the next transfer status.
///
/// The raw value is lower-cased before lookup. Known values map to the closed
/// enum; unknown values pass through as `Unrecognized`. Progression is not
/// enforced: any mapped status overwrites any prior status, including a
/// terminal one, because the provider's delivery-order guarantee is unknown.
pub fn apply_provider_status(current: &TransferStatus, raw: &str) -> TransferStatus {
    let _ = current;
    let normalized = raw.to_lowercase();
    match normalized.as_str() {
        "pending" => TransferStatus::Pending,
        "sent" => TransferStatus::Sent,
        "deposited" => TransferStatus::Deposited,
        "failed" => TransferStatus::Failed,
        _ => TransferStatus::Unrecognized(normalized),
    }
}
