use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the multispin crates.
///
/// Only programmer-usage mistakes and I/O failures surface here. Malformed
/// option values never do: the purging layer drops them silently.
#[derive(Error, Debug)]
pub enum SpinnersError {
    /// A spinner operation was called with an empty name.
    #[error("A spinner reference name must be specified")]
    MissingName,

    /// `add` was called with a name that is already registered.
    #[error("A spinner named '{0}' already exists")]
    DuplicateName(String),

    /// No spinner is registered under the given name.
    #[error("No spinner initialized with name {0}")]
    UnknownSpinner(String),

    /// `configure_status` was called with an empty status name.
    #[error("Status name must be a non-empty string")]
    MissingStatusName,

    /// A color name is not part of the palette.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// The dispatch table has no operation with the given name.
    #[error("Unknown spinner operation: {0}")]
    UnknownOperation(String),

    /// A configuration file could not be opened or read from disk.
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for terminal write failures.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the multispin crates.
pub type Result<T> = std::result::Result<T, SpinnersError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_name() {
        let err = SpinnersError::MissingName;
        assert_eq!(err.to_string(), "A spinner reference name must be specified");
    }

    #[test]
    fn test_error_display_duplicate_name() {
        let err = SpinnersError::DuplicateName("build".to_string());
        assert_eq!(err.to_string(), "A spinner named 'build' already exists");
    }

    #[test]
    fn test_error_display_unknown_spinner() {
        let err = SpinnersError::UnknownSpinner("deploy".to_string());
        assert_eq!(err.to_string(), "No spinner initialized with name deploy");
    }

    #[test]
    fn test_error_display_invalid_color() {
        let err = SpinnersError::InvalidColor("orange".to_string());
        assert_eq!(err.to_string(), "Invalid color: orange");
    }

    #[test]
    fn test_error_display_unknown_operation() {
        let err = SpinnersError::UnknownOperation("explode".to_string());
        assert_eq!(err.to_string(), "Unknown spinner operation: explode");
    }

    #[test]
    fn test_error_display_config_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = SpinnersError::ConfigRead {
            path: PathBuf::from("/etc/multispin.json"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read config file"));
        assert!(msg.contains("/etc/multispin.json"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: SpinnersError = io_err.into();
        assert!(err.to_string().contains("pipe closed"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: SpinnersError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
