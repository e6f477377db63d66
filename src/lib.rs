//! Payout Gateway - Payment transfer gateway.
//!
//! Accepts transfer requests from business clients, forwards them to an
//! external money-movement provider, and reconciles asynchronous status
//! updates delivered via webhook.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
