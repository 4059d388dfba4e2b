use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type used across the entire application.
#[derive(Debug, Error)]
pub enum BatteryError {
    #[error("config error: {0}")]
    Config(String),

    /// Stored data exists but cannot be decoded.
    #[error("corrupt data in '{}': {reason}", path.display())]
    StorageCorrupt { path: PathBuf, reason: String },

    /// Reading stored data failed for a reason other than the file being absent.
    #[error("cannot read '{}': {source}", path.display())]
    StorageRead {
        path:   PathBuf,
        source: std::io::Error,
    },

    /// Writing or publishing a new file failed; the previous file is untouched.
    #[error("cannot write '{}': {source}", path.display())]
    StorageWrite {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("invalid battery sample: {0}")]
    InvalidSample(String),

    #[error("system error: {0}")]
    System(String),
}

impl BatteryError {
    /// `false` when retrying is pointless until someone intervenes
    /// (disk full, read-only filesystem, missing permissions).
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::StorageRead { source, .. }
            | Self::StorageWrite { source, .. } => !matches!(
                source.kind(),
                ErrorKind::StorageFull | ErrorKind::ReadOnlyFilesystem | ErrorKind::PermissionDenied
            ),
            Self::Config(_) => false,
            Self::StorageCorrupt { .. } | Self::InvalidSample(_) | Self::System(_) => true,
        }
    }
}

pub type Result<T, E = BatteryError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_full_is_not_recoverable() {
        let err = BatteryError::StorageWrite {
            path:   PathBuf::from("/tmp/x"),
            source: std::io::Error::from(ErrorKind::StorageFull),
        };
        assert!(!err.is_recoverable());
    }

    #[test]
    fn corrupt_data_is_recoverable() {
        let err = BatteryError::StorageCorrupt {
            path:   PathBuf::from("/tmp/x"),
            reason: "expected value".into(),
        };
        assert!(err.is_recoverable());
    }

    #[test]
    fn interrupted_write_is_recoverable() {
        let err = BatteryError::StorageWrite {
            path:   PathBuf::from("/tmp/x"),
            source: std::io::Error::from(ErrorKind::Interrupted),
        };
        assert!(err.is_recoverable());
    }
}
