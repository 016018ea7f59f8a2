use std::io;

// Represents errors that can occur within the platform abstraction layer.
//
// Front ends report these when they cannot carry out a command, such as
// writing the replacement document or reading a file the user chose.
#[derive(Debug)]
pub enum PlatformError {
    /// An I/O error while talking to the host environment.
    Io(io::Error),
    /// A requested operation could not be completed.
    OperationFailed(String),
}

impl From<io::Error> for PlatformError {
    fn from(err: io::Error) -> Self {
        PlatformError::Io(err)
    }
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::Io(e) => write!(f, "I/O Error: {e}"),
            PlatformError::OperationFailed(s) => write!(f, "Operation Failed: {s}"),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlatformError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// A specialized `Result` type for platform layer operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
