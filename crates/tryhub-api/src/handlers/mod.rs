//! Request handlers organized by resource.

pub mod builders;
pub mod changes;
pub mod commits;
pub mod health;
pub mod refs;
pub mod work;
