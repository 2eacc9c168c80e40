//! Error types for repo-sync

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while synchronizing files
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed manifest line
    #[error("invalid manifest pattern on line {line} ({pattern:?}): {reason}")]
    Manifest {
        /// 1-based line number in the manifest
        line: usize,
        /// The offending line, as written
        pattern: String,
        /// Why the pattern was rejected
        reason: String,
    },

    /// Local filesystem failure, annotated with the path involved
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// No usable credential
    #[error("authentication error: {0}")]
    Auth(String),

    /// Hosting API unreachable, unauthorized, or returned an error
    #[error("remote access error: {0}")]
    RemoteAccess(String),

    /// Failure after the working branch was created
    ///
    /// The branch and any files already applied are left in place.
    #[error("submission failed on branch '{branch}': {message}")]
    Submission {
        /// Working branch left behind on the remote
        branch: String,
        /// What went wrong
        message: String,
    },
}

impl Error {
    /// Bad arguments or manifest syntax
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Manifest { .. })
    }

    /// Local filesystem failure
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Authentication, network or API failure with no remote side effects
    pub const fn is_remote_access(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::RemoteAccess(_))
    }

    /// Failure that left a branch behind
    pub const fn is_submission(&self) -> bool {
        matches!(self, Self::Submission { .. })
    }

    /// Branch left on the remote, if any
    pub fn branch(&self) -> Option<&str> {
        match self {
            Self::Submission { branch, .. } => Some(branch),
            _ => None,
        }
    }
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => Self::RemoteAccess(format!(
                "GitHub returned {}: {}",
                source.status_code, source.message
            )),
            other => Self::RemoteAccess(other.to_string()),
        }
    }
}

/// Convenience constructor for [`Error::Io`]
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> Error {
    Error::Io {
        path: path.into(),
        source,
    }
}

/// Result alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
