use thiserror::Error;

/// Reasons a locator request can fail.
///
/// The `Display` text of each variant is the reason string handed back to
/// callers, so it is part of the external contract.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("Missing filePath")]
    MissingPath,

    #[error("Invalid path")]
    InvalidPath,

    #[error("File not found")]
    FileNotFound,

    #[error("Target node not found at specified line/column")]
    NodeNotFound,

    #[error("failed to read source: {0}")]
    Read(#[source] std::io::Error),

    #[error("source could not be parsed: {0}")]
    Parse(String),

    #[error("code generation failed: {0}")]
    Generation(String),

    #[error("invalid locator configuration: {0}")]
    Config(String),
}

/// Reason reported for faults that are not the caller's doing.
pub const GENERIC_FAILURE: &str = "Failed to extract code blocks";

impl LocatorError {
    /// Validation and not-found failures are the caller's to handle; everything
    /// else is an internal fault.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            LocatorError::MissingPath
                | LocatorError::InvalidPath
                | LocatorError::FileNotFound
                | LocatorError::NodeNotFound
        )
    }

    /// Reason string as reported in a failed result.
    pub fn reason(&self) -> String {
        if self.is_expected() {
            self.to_string()
        } else {
            GENERIC_FAILURE.to_string()
        }
    }
}
