//! Git command abstraction layer
//!
//! Everything attribution learns about a repository comes from running git
//! commands. This module defines the [Shell] trait those commands go through,
//! so the tag model and the release workflow can be driven either by the real
//! `git` binary or by a scripted mock in tests.
//!
//! - [system::SystemShell]: runs commands as child processes
//! - [mock::MockShell]: records commands and replays scripted output
//! - [repository::TagRepository]: tag listing, lookup, creation and the
//!   "commits since release" query built on top of a [Shell]
//!
//! ```rust
//! # use attribution::git::{Shell, ShellCommand};
//! # fn example(shell: &dyn Shell) -> attribution::Result<()> {
//! let names = shell.run(&ShellCommand::git(["tag", "--list"]))?;
//! for name in names.lines() {
//!     println!("{}", name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;
pub mod system;

pub use mock::MockShell;
pub use repository::{discover_root, TagRepository};
pub use system::SystemShell;

use crate::error::Result;
use std::fmt;

/// A program invocation: the program name plus its literal arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ShellCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ShellCommand {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a `git` invocation
    pub fn git<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ShellCommand::new("git", args)
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Program followed by arguments, as a single vector
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

/// Renders the command the way a user would type it, quoting arguments that
/// contain whitespace or shell metacharacters.
impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,~^".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Executes external commands on behalf of attribution
///
/// ## Error Handling
///
/// A command that exits non-zero is always surfaced as
/// [crate::error::AttributionError::ExternalCommand]; implementations never
/// retry and never time out.
pub trait Shell: Send + Sync {
    /// Run a command and return its combined output (stdout, then stderr)
    fn run(&self, command: &ShellCommand) -> Result<String>;

    /// Run a command attached to the user's terminal, e.g. for paged logs
    fn run_interactive(&self, command: &ShellCommand) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_command_argv() {
        let cmd = ShellCommand::git(["tag", "--list"]);
        assert_eq!(cmd.argv(), vec!["git", "tag", "--list"]);
    }

    #[test]
    fn test_arg_appends() {
        let cmd = ShellCommand::git(["shortlog", "-s"]).arg("v0.5...v1.0");
        assert_eq!(cmd.args, vec!["shortlog", "-s", "v0.5...v1.0"]);
    }

    #[test]
    fn test_display_plain() {
        let cmd = ShellCommand::git(["shortlog", "-s", "v0.5...v1.0"]);
        assert_eq!(cmd.to_string(), "git shortlog -s v0.5...v1.0");
    }

    #[test]
    fn test_display_quotes_arguments() {
        let cmd = ShellCommand::git(["tag", "-m", "it's done", ""]);
        assert_eq!(cmd.to_string(), r"git tag -m 'it'\''s done' ''");
    }
}
