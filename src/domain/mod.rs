//! Domain layer - pure types and logic.

pub mod foundation;
pub mod transfer;
pub mod webhook;
