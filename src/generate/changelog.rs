use crate::error::Result;
use crate::generate::{heading, GeneratedFile};
use crate::project::Project;
use std::fmt::Write;
use std::path::PathBuf;
use tracing::warn;

/// `CHANGELOG.md`: one section per release with its message and shortlog
pub struct Changelog;

impl GeneratedFile for Changelog {
    fn relative_path(&self, project: &Project) -> PathBuf {
        PathBuf::from(&project.config.changelog_path)
    }

    fn generate(&self, project: &Project) -> Result<String> {
        let shell = project.shell();
        let mut out = heading(&project.name, '=');

        for tag in project.tags()? {
            out.push('\n');
            out.push_str(&heading(&tag.name, '-'));

            // One unreadable tag must not sink the whole changelog
            let message = match tag.message(shell) {
                Ok(message) => message.trim(),
                Err(err) => {
                    warn!("no message for {}: {}", tag.name, err);
                    ""
                }
            };
            if !message.is_empty() {
                let _ = write!(out, "\n{}\n", message);
            }

            let shortlog = tag.shortlog(shell);
            if !shortlog.is_empty() {
                let command = tag.shortlog_command(shell)?;
                let _ = write!(out, "\n    $ {}\n", command);
                for line in shortlog.lines() {
                    let _ = writeln!(out, "    {}", line);
                }
            }
        }

        Ok(out)
    }
}
