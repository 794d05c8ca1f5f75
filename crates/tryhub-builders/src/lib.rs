//! Builder eligibility engine for tryhub.
//!
//! Decides which builders run which repositories and branches, in
//! pre-submit and post-submit mode, and which dist test groups they run.

pub mod branch;
mod catalog;
pub mod profile;
pub mod registry;
pub mod rules;

pub use branch::{Branch, Target, canonical_branch};
pub use profile::{Builder, BuilderProfile, HostProfile, Policy};
pub use registry::BuilderRegistry;
pub use rules::{Applies, Axis, DistTestSkip, Requirement, Rule, RunMode};
