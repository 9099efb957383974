// src/engine/report.rs

use std::fmt;
use std::path::PathBuf;

/// Consolidated status of one request.
///
/// `Display` renders the caller-facing text:
///
/// ```text
/// Execute command complete. Command execution output from <artifact>
/// <artifact content, verbatim>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub is_running: bool,
    pub artifact_path: PathBuf,
    pub content: String,
    /// Whether the content differed from what the monitor saw before.
    /// Diagnostics only; it never changes how the request resolves.
    pub has_changes: bool,
}

impl Report {
    pub fn status_line(&self) -> &'static str {
        if self.is_running {
            "Execute Command still running. "
        } else {
            "Execute command complete. "
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Command execution output from {}\n{}",
            self.status_line(),
            self.artifact_path.display(),
            self.content
        )
    }
}
