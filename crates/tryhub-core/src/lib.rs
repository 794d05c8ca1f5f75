//! tryhub Core
//!
//! Core domain types, traits, and error handling for tryhub.
//! This crate has minimal dependencies and defines the shared vocabulary
//! used by the eligibility engine, the try-work cache and the API.

pub mod corpus;
pub mod error;
pub mod ports;
pub mod version;
pub mod work;

pub use error::{Error, ErrorKind, Result};
pub use work::*;
