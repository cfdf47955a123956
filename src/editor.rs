use crate::error::{AttributionError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Lets the user edit a block of text
pub trait MessageEditor {
    /// Present `template` for editing
    ///
    /// Returns `Ok(None)` when the user aborted the edit.
    fn edit(&self, template: &str) -> Result<Option<String>>;
}

/// Edits text in the user's editor through a scratch file
///
/// The editor comes from `GIT_EDITOR`, `VISUAL` or `EDITOR`, falling back to
/// `vi`, and is run through `sh` so quoted paths and arguments work. An editor
/// exiting non-zero counts as an aborted edit.
pub struct SystemEditor {
    scratch: PathBuf,
}

impl SystemEditor {
    /// Use `scratch` as the file handed to the editor
    pub fn new(scratch: impl Into<PathBuf>) -> Self {
        SystemEditor {
            scratch: scratch.into(),
        }
    }

    pub fn editor_command() -> String {
        ["GIT_EDITOR", "VISUAL", "EDITOR"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "vi".to_string())
    }
}

impl MessageEditor for SystemEditor {
    fn edit(&self, template: &str) -> Result<Option<String>> {
        fs::write(&self.scratch, template)?;

        let editor = Self::editor_command();

        debug!("opening {} in {}", self.scratch.display(), editor);
        let status = editor_process(&editor, &self.scratch)
            .status()
            .map_err(|e| AttributionError::editor(format!("failed to open editor '{}': {}", editor, e)));

        let status = match status {
            Ok(status) => status,
            Err(err) => {
                fs::remove_file(&self.scratch).ok();
                return Err(err);
            }
        };

        if !status.success() {
            fs::remove_file(&self.scratch).ok();
            // 127 is the shell's "command not found"
            if cfg!(unix) && status.code() == Some(127) {
                return Err(AttributionError::editor(format!("editor '{}' not found", editor)));
            }
            return Ok(None);
        }

        let edited = fs::read_to_string(&self.scratch)?;
        fs::remove_file(&self.scratch).ok();
        Ok(Some(edited))
    }
}

/// The editor value is a shell snippet, run the way git runs it
#[cfg(unix)]
fn editor_process(editor: &str, file: &Path) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(format!("{} \"$@\"", editor))
        .arg(editor)
        .arg(file);
    cmd
}

#[cfg(not(unix))]
fn editor_process(editor: &str, file: &Path) -> Command {
    let mut words = editor.split_whitespace();
    let mut cmd = Command::new(words.next().unwrap_or("notepad"));
    cmd.args(words).arg(file);
    cmd
}

/// Drop `#` comment lines and surrounding blank space
pub fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
