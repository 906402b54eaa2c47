//! Error types for reproject-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from reproject-core
    #[error(transparent)]
    Core(#[from] reproject_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Logging could not be initialised
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Core(e) => e.exit_code(),
            Self::Io(_) => 2,
            Self::Logging(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_exit_code_passes_through() {
        let err = CliError::from(reproject_core::Error::MissingProjectName);
        assert_eq!(err.exit_code(), 7);
        assert_eq!(err.to_string(), "No project name: set PROJECT_NAME or JOB_NAME");
    }

    #[test]
    fn test_io_exit_code() {
        let err = CliError::from(std::io::Error::other("stdout closed"));
        assert_eq!(err.exit_code(), 2);
    }
}
