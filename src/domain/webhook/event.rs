//! Provider webhook event envelope.
//!
//! The provider delivers events as `{type, data: {id, status, metadata}}`.
//! Only `metadata.localTransferId` ties an event back to a local transfer;
//! events without it are acknowledged and dropped.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::TransferId;

/// One webhook delivery from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEvent {
    /// Provider classification, e.g. `transfer.deposited`.
    #[serde(rename = "type")]
    pub event_type: String,

    pub data: ProviderEventData,
}

/// Payload of a provider event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEventData {
    /// Provider transaction id.
    pub id: String,

    /// Raw provider status string; fed to the state machine.
    pub status: String,

    /// Correlation metadata echoed back from the submission.
    #[serde(default)]
    pub metadata: Option<ProviderEventMetadata>,
}

/// Metadata the gateway attached at submission time, echoed by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEventMetadata {
    #[serde(rename = "localTransferId")]
    pub local_transfer_id: Option<String>,
}

impl ProviderEvent {
    /// The local transfer this event references, if the metadata carries a
    /// parseable id.
    pub fn local_transfer_id(&self) -> Option<TransferId> {
        self.data
            .metadata
            .as_ref()
            .and_then(|m| m.local_transfer_id.as_deref())
            .and_then(|s| s.parse().ok())
    }
}
