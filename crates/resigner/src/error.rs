use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ResignError {
    #[error("Signing configuration is invalid: {0}")]
    ConfigInvalid(String),
    #[error("Could not read signing configuration {}: {source}", .path.display())]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Unsupported algorithm: {0}")]
    AlgorithmUnsupported(String),
    #[error("Template token {token:?} references an undefined parameter")]
    IndexOutOfRange { token: String },
    #[error("Could not read message {}: {source}", .path.display())]
    MessageUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to splice signature into {}: {source}", .path.display())]
    SpliceIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Digest stage {algorithm} failed: {reason}")]
    Digest { algorithm: String, reason: String },
}

impl ResignError {
    /// Process exit code for this failure category.
    ///
    /// Codes start at 10 so they never collide with clap's usage error (2).
    pub fn exit_code(&self) -> u8 {
        match self {
            ResignError::ConfigInvalid(_) => 10,
            ResignError::ConfigNotFound { .. } => 11,
            ResignError::AlgorithmUnsupported(_) => 12,
            ResignError::IndexOutOfRange { .. } => 13,
            ResignError::MessageUnreadable { .. } => 14,
            ResignError::SpliceIo { .. } => 15,
            ResignError::Digest { .. } => 16,
        }
    }

    /// Name of the run stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            ResignError::ConfigInvalid(_)
            | ResignError::ConfigNotFound { .. }
            | ResignError::AlgorithmUnsupported(_) => "config",
            ResignError::MessageUnreadable { .. } => "scan",
            ResignError::IndexOutOfRange { .. } => "compose",
            ResignError::Digest { .. } => "digest",
            ResignError::SpliceIo { .. } => "splice",
        }
    }
}
