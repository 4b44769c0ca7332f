//! Error types for sdpcache
//!
//! All modules use `SdpResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sdpcache operations
pub type SdpResult<T> = Result<T, SdpError>;

/// All errors that can occur in sdpcache
#[derive(Error, Debug)]
pub enum SdpError {
    // Model errors
    #[error("Unknown parameter '{name}' for model {model}")]
    UnknownParameter { model: String, name: String },

    #[error("Invalid lattice: {0}")]
    InvalidLattice(String),

    #[error("Unsupported configuration: {0}")]
    Unsupported(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    // Relaxation errors
    #[error("Relaxation cannot be recycled: {reason}")]
    RecycleIncompatible { reason: String },

    #[error("Relaxation build failed: {0}")]
    BuildFailed(String),

    #[error("Moment not available in solution: {0}")]
    MomentUnavailable(String),

    // Solver errors
    #[error("No solver command configured")]
    SolverUnavailable,

    #[error("Solver {solver} failed: {reason}")]
    SolverFailed { solver: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Persistence is disabled: no output directory configured")]
    StoreDisabled,

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    User(String),
}

impl SdpError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a recycle incompatibility error
    pub fn incompatible(reason: impl Into<String>) -> Self {
        Self::RecycleIncompatible {
            reason: reason.into(),
        }
    }

    /// Create an unsupported configuration error
    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::Unsupported(what.into())
    }

    /// Whether the caller may retry the failed operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SolverFailed { .. } | Self::CommandFailed { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::SolverUnavailable => {
                Some("Set [solver] command in the config file, e.g. run: sdpcache config init")
            }
            Self::StoreDisabled => Some("Pass --output-dir or set [store] output_dir"),
            Self::UnknownModel(_) => {
                Some("Supported models: bose-hubbard, fermi-hubbard, long-range-kitaev")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SdpError::incompatible("3 moment inequalities, expected 0");
        assert!(err.to_string().contains("cannot be recycled"));
    }

    #[test]
    fn error_hint() {
        assert!(SdpError::SolverUnavailable.hint().is_some());
        assert_eq!(SdpError::unsupported("2D").hint(), None);
    }

    #[test]
    fn error_retryable() {
        let err = SdpError::SolverFailed {
            solver: "sdpa".to_string(),
            reason: "exit code 1".to_string(),
        };
        assert!(err.is_retryable());
        assert!(!SdpError::unsupported("antiperiodic").is_retryable());
    }
}
