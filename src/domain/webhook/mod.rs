//! Webhook verification and event envelope types.

mod event;
mod verifier;

pub use event::{ProviderEvent, ProviderEventData, ProviderEventMetadata};
pub use verifier::verify_signature;
