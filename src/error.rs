use std::path::PathBuf;
use std::{fmt, io};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    /// The reader or writer handed to the store failed.
    #[error("profile stream is unavailable")]
    StreamUnavailable {
        #[source]
        source: io::Error,
    },

    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("permission denied for {}: {reason}", path.display())]
    PermissionDenied { path: PathBuf, reason: Denial },
}

/// Why a profile file could not be opened for the requested write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The file is not readable and the read flag could not be set.
    Unreadable,
    /// The file is read-only and the write flag could not be set.
    ReadOnly,
    /// The user refused to relax the file's permissions.
    Declined,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unreadable => "file is not readable by the current user".fmt(f),
            Self::ReadOnly => "file is read-only".fmt(f),
            Self::Declined => "user declined to change the file permissions".fmt(f),
        }
    }
}
