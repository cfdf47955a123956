//! User-facing output.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Printing to the terminal
//!
//! Diagnostics go through `tracing`; this module is for the handful of lines
//! the user is meant to read.

use std::path::Path;

use crate::domain::{Tag, Version};

pub mod formatter;

/// Print an error message to stderr.
pub fn display_error(message: &str) {
    eprintln!("{}", formatter::error_line(message));
}

/// Print a success message.
pub fn display_success(message: &str) {
    println!("{}", formatter::success_line(message));
}

/// Print a status message.
pub fn display_status(message: &str) {
    println!("{}", formatter::status_line(message));
}

/// Print the notice for a release that failed after mutating the repository.
pub fn display_release_failure(version: &Version, recovery: Option<&Path>) {
    for line in formatter::release_failure_lines(version, recovery) {
        eprintln!("{}", line);
    }
}

/// Print release tags, newest first.
pub fn display_tags(tags: &[Tag]) {
    if tags.is_empty() {
        display_status("No release tags found");
        return;
    }
    for line in formatter::tag_list_lines(tags) {
        println!("{}", line);
    }
}
