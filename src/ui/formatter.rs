//! Pure formatting functions for UI output.
//!
//! Everything here builds strings; printing happens in the parent module.

use crate::domain::{Tag, Version};
use console::style;
use std::path::Path;

/// Red `ERROR:` prefixed line
pub fn error_line(message: &str) -> String {
    format!("{} {}", style("ERROR:").red(), message)
}

/// Green check mark line
pub fn success_line(message: &str) -> String {
    format!("{} {}", style("✓").green(), message)
}

/// Yellow arrow line
pub fn status_line(message: &str) -> String {
    format!("{} {}", style("→").yellow(), message)
}

/// Notice shown when a release fails part-way through
///
/// Points to the recovery file when one could be written, and always warns
/// that the repository must be checked by hand.
pub fn release_failure_lines(version: &Version, recovery: Option<&Path>) -> Vec<String> {
    let mut lines = Vec::new();
    match recovery {
        Some(path) => lines.push(error_line(&format!(
            "Failed to tag release {}, message saved to {}",
            version,
            path.display()
        ))),
        None => lines.push(error_line(&format!(
            "Failed to tag release {}, and the message could not be saved",
            version
        ))),
    }
    lines.push(error_line(
        "Repository state is unknown, manual inspection recommended",
    ));
    lines
}

/// One line per release tag, newest first
pub fn tag_list_lines(tags: &[Tag]) -> Vec<String> {
    tags.iter()
        .map(|tag| format!("{:<16} {}", tag.name, style(&tag.version).dim()))
        .collect()
}
