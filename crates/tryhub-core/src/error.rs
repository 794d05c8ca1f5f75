//! Error types for tryhub.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Validation errors
    #[error("Invalid {field}: {value:?}")]
    InvalidCommit { field: &'static str, value: String },

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid builder definition: {0}")]
    InvalidBuilder(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    // Lookup errors
    #[error("Unknown project: {server}/{project}")]
    UnknownProject { server: String, project: String },

    #[error("Unknown builder: {0}")]
    UnknownBuilder(String),

    #[error("Unknown host type: {0}")]
    UnknownHost(String),

    #[error("Unknown change: {0}")]
    UnknownChange(i32),

    // Upstream errors
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Upstream query timed out after {seconds} seconds")]
    UpstreamTimeout { seconds: u64 },

    // Computed-state errors
    #[error("There was a problem finding supported Go releases (found {found})")]
    ReleasesUnavailable { found: usize },

    // Infrastructure errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Upstream,
    Invariant,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidCommit { .. }
            | Error::InvalidVersion(_)
            | Error::InvalidBuilder(_)
            | Error::InvalidQuery(_) => ErrorKind::Validation,
            Error::UnknownProject { .. }
            | Error::UnknownBuilder(_)
            | Error::UnknownHost(_)
            | Error::UnknownChange(_) => ErrorKind::NotFound,
            Error::Upstream(_) | Error::UpstreamTimeout { .. } => ErrorKind::Upstream,
            Error::ReleasesUnavailable { .. } => ErrorKind::Invariant,
            Error::Config(_) | Error::Io(_) | Error::Serialization(_) | Error::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let err = Error::InvalidCommit {
            field: "commit",
            value: "abc".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Invalid commit: \"abc\"");

        assert_eq!(Error::UnknownBuilder("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(Error::UpstreamTimeout { seconds: 10 }.kind(), ErrorKind::Upstream);
        assert_eq!(Error::ReleasesUnavailable { found: 1 }.kind(), ErrorKind::Invariant);
    }
}
