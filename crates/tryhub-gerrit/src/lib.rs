//! Gerrit REST adapter for the change-tracker port.

pub mod client;

pub use client::{GerritClient, GerritConfig};
