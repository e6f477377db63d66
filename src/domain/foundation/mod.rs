//! Shared value objects used across the domain.

mod ids;
mod timestamp;

pub use ids::{BusinessUserId, TransferId};
pub use timestamp::Timestamp;
