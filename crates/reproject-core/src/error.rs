//! Error types for reproject-core

use std::path::PathBuf;

/// Result type for reproject-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning a template into a manifest
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading the template or writing the output failed
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template is not well-formed JSON
    #[error("Failed to parse template at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The version-control executable could not be started
    #[error("Failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The version-control command exited unsuccessfully
    #[error("`{program}` exited with {}", describe_code(.code))]
    ProcessExit { program: String, code: Option<i32> },

    /// A placeholder had no value and the missing-value policy is strict
    #[error("No value for placeholder {token}")]
    UndefinedLookup { token: String },

    /// The template does not have the expected shape
    #[error("Invalid manifest: {message}")]
    InvalidManifest { message: String },

    /// Neither the environment, the remote nor the template provide a name
    #[error("No project name: set PROJECT_NAME or JOB_NAME")]
    MissingProjectName,

    /// The resolved manifest could not be serialized
    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidManifest {
            message: message.into(),
        }
    }

    /// Process exit code reported for this failure.
    ///
    /// Each failure kind maps to its own code so wrapping scripts can tell
    /// a broken template apart from a broken checkout.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Serialize(_) => 1,
            Self::Io { .. } => 2,
            Self::Parse { .. } => 3,
            Self::Spawn { .. } | Self::ProcessExit { .. } => 4,
            Self::UndefinedLookup { .. } => 5,
            Self::InvalidManifest { .. } => 6,
            Self::MissingProjectName => 7,
        }
    }
}
