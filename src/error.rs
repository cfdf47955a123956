use thiserror::Error;

/// Unified error type for attribution operations
#[derive(Error, Debug)]
pub enum AttributionError {
    #[error("Invalid version format: '{0}'")]
    InvalidVersionFormat(String),

    #[error("Unexpected tag object contents for '{0}'")]
    TagHeaderMismatch(String),

    #[error("Command `{command}` failed with exit code {}: {}", exit_label(.exit_code), .stderr.trim())]
    ExternalCommand {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("Release {0} already exists")]
    DuplicateRelease(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Editor error: {0}")]
    Editor(String),

    #[error("Git repository error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// Convenience type alias for Results in attribution
pub type Result<T> = std::result::Result<T, AttributionError>;

impl AttributionError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        AttributionError::Config(msg.into())
    }

    /// Create an invalid version error for the offending text
    pub fn version(text: impl Into<String>) -> Self {
        AttributionError::InvalidVersionFormat(text.into())
    }

    /// Create an editor error with context
    pub fn editor(msg: impl Into<String>) -> Self {
        AttributionError::Editor(msg.into())
    }

    /// True when an external command exited unsuccessfully
    pub fn is_external_command(&self) -> bool {
        matches!(self, AttributionError::ExternalCommand { .. })
    }
}
