//! Outbound adapters.

pub mod memory;
pub mod persistence;
