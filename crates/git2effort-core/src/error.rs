use std::path::PathBuf;

/// Errors that can occur while estimating effort.
///
/// Library crates use this type directly; the binary crate reports it
/// through `miette`.
///
/// # Examples
///
/// ```
/// use git2effort_core::EffortError;
///
/// let err = EffortError::Config("threshold must be positive".into());
/// assert!(err.to_string().contains("threshold must be positive"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum EffortError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(
        code(git2effort::config),
        help("period_length must be 1, 2, 3, 4, 6 or 12 and threshold must be at least 1")
    )]
    Config(String),

    /// Git operation failure.
    #[error("git error: {0}")]
    #[diagnostic(code(git2effort::git))]
    Git(String),

    /// An author string that is not of the form `Name <email>`.
    #[error("malformed author identity: {0:?}")]
    #[diagnostic(code(git2effort::identity), help("authors must look like `Name <email>`"))]
    Identity(String),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: EffortError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = EffortError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn identity_error_quotes_raw_author() {
        let err = EffortError::Identity("nobody".into());
        assert_eq!(err.to_string(), "malformed author identity: \"nobody\"");
    }

    #[test]
    fn file_not_found_shows_path() {
        let err = EffortError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert!(err.to_string().contains("/tmp/missing.toml"));
    }
}
