//! Release workflow orchestration
//!
//! Cutting a release is a sequence of git commands that cannot be made
//! atomic: an empty "version bump" commit, a provisional tag, regenerated
//! artifacts, an amend that folds the artifacts into the bump commit, and a
//! final re-tag with the configured signing policy. When any of those steps
//! fails the repository is left as it is, the release message is saved to a
//! recovery file, and the error is returned.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::domain::{Tag, Version};
use crate::editor::{strip_comments, MessageEditor};
use crate::error::{AttributionError, Result};
use crate::generate::configured_files;
use crate::git::ShellCommand;
use crate::project::Project;
use crate::ui;

/// Progress of a release through its steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseState {
    Idle,
    MessageComposed,
    CommitCreated,
    TagCreated,
    ArtifactsWritten,
    Finalized,
    /// A step after message composition failed; the repository may hold a
    /// stray commit or tag.
    Failed,
}

/// How a release attempt ended, when it did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    /// The release tag now points at the amended bump commit
    Released(Tag),
    /// The user left the release message empty or aborted the editor
    Cancelled,
}

/// Drives one release of a [Project]
pub struct ReleaseWorkflow<'a> {
    project: &'a mut Project,
    editor: &'a dyn MessageEditor,
    state: ReleaseState,
}

impl<'a> ReleaseWorkflow<'a> {
    pub fn new(project: &'a mut Project, editor: &'a dyn MessageEditor) -> Self {
        ReleaseWorkflow {
            project,
            editor,
            state: ReleaseState::Idle,
        }
    }

    pub fn state(&self) -> ReleaseState {
        self.state
    }

    /// File the release message is saved to when a release fails
    pub fn recovery_path(&self, version: &Version) -> PathBuf {
        self.project.path(format!(".attribution-{}.txt", version))
    }

    fn transition(&mut self, next: ReleaseState) {
        debug!("release state: {:?} → {:?}", self.state, next);
        self.state = next;
    }

    /// Release `version`, with `message` as the tag text
    ///
    /// Without a message the user is asked to write one in their editor,
    /// starting from the commit log since the previous release.
    ///
    /// # Returns
    /// * `Ok(ReleaseOutcome::Released)` - Commit, tag and artifacts are in place
    /// * `Ok(ReleaseOutcome::Cancelled)` - Nothing was changed
    /// * `Err(DuplicateRelease)` - `version` is already tagged; nothing was changed
    /// * `Err` - A git command or file write failed
    pub fn run(&mut self, version: &Version, message: Option<&str>) -> Result<ReleaseOutcome> {
        if let Some(existing) = self.project.repository().find_by_version(version)? {
            return Err(AttributionError::DuplicateRelease(existing.name));
        }

        let message = match message {
            Some(message) => message.trim().to_string(),
            None => match self.compose_message(version)? {
                Some(message) => message,
                None => return Ok(ReleaseOutcome::Cancelled),
            },
        };

        if message.is_empty() {
            info!("empty release message, not tagging {}", version);
            return Ok(ReleaseOutcome::Cancelled);
        }
        self.transition(ReleaseState::MessageComposed);

        match self.publish(version, &message) {
            Ok(tag) => Ok(ReleaseOutcome::Released(tag)),
            Err(err) => {
                self.transition(ReleaseState::Failed);
                error!("release {} failed: {}", version, err);

                let recovery = self.recovery_path(version);
                let saved = match fs::write(&recovery, &message) {
                    Ok(()) => Some(recovery),
                    Err(write_err) => {
                        error!("could not save release message to {}: {}", recovery.display(), write_err);
                        None
                    }
                };
                ui::display_release_failure(version, saved.as_deref());

                Err(err)
            }
        }
    }

    /// Text the user starts editing from: the version on its own line, then
    /// the commit log since the newest release, commented out.
    pub fn message_template(&self, version: &Version) -> Result<String> {
        let latest = self.project.latest_tag()?;
        let command = self.project.repository().shortlog_since(Some(&latest));

        let log = match self.project.shell().run(&command) {
            Ok(log) => log,
            Err(err) => {
                warn!("could not list commits since {}: {}", latest.name, err);
                String::new()
            }
        };

        let since = if latest.is_null() {
            "the first commit".to_string()
        } else {
            latest.name.clone()
        };

        let mut template = format!("{}\n\n# Commits since {}:\n", version, since);
        for line in log.lines().filter(|line| !line.trim().is_empty()) {
            template.push_str("#   ");
            template.push_str(line);
            template.push('\n');
        }
        template.push_str("#\n# Lines starting with '#' are ignored. An empty message aborts the release.\n");
        Ok(template)
    }

    fn compose_message(&self, version: &Version) -> Result<Option<String>> {
        let template = self.message_template(version)?;
        Ok(self
            .editor
            .edit(&template)?
            .map(|edited| strip_comments(&edited))
            .filter(|message| !message.is_empty()))
    }

    fn publish(&mut self, version: &Version, message: &str) -> Result<Tag> {
        let subject = format!("Version bump {}", version.tag_name());
        self.project.shell().run(&ShellCommand::git([
            "commit",
            "--allow-empty",
            "-m",
            subject.as_str(),
        ]))?;
        self.transition(ReleaseState::CommitCreated);

        let mut tag = self.project.repository().create(version, message, false)?;
        self.transition(ReleaseState::TagCreated);

        self.project.insert_tag(tag.clone())?;
        for file in configured_files(self.project) {
            file.write_and_stage(self.project)?;
        }
        self.transition(ReleaseState::ArtifactsWritten);

        self.project
            .shell()
            .run(&ShellCommand::git(["commit", "--amend", "--no-edit"]))?;
        let signed = self.project.config.signed_tags;
        self.project
            .repository()
            .update(&mut tag, Some(message), signed)?;
        self.transition(ReleaseState::Finalized);

        info!("released {}", tag.name);
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::git::MockShell;
    use std::cell::RefCell;

    struct ScriptedEditor {
        reply: Option<String>,
        seen: RefCell<Option<String>>,
    }

    impl ScriptedEditor {
        fn replying(reply: Option<&str>) -> Self {
            ScriptedEditor {
                reply: reply.map(String::from),
                seen: RefCell::new(None),
            }
        }
    }

    impl MessageEditor for ScriptedEditor {
        fn edit(&self, template: &str) -> Result<Option<String>> {
            *self.seen.borrow_mut() = Some(template.to_string());
            Ok(self.reply.clone())
        }
    }

    fn project(shell: &MockShell, root: &std::path::Path) -> Project {
        let mut config = Config::default();
        config.signed_tags = false;
        Project::new("demo", root, config, Box::new(shell.clone()))
    }

    fn has_mutation(shell: &MockShell) -> bool {
        shell.calls().iter().any(|c| {
            matches!(
                c.args.first().map(String::as_str),
                Some("commit") | Some("add")
            ) || (c.args.first().map(String::as_str) == Some("tag")
                && c.args.get(1).map(String::as_str) != Some("--list"))
        })
    }

    #[test]
    fn test_duplicate_release_aborts_before_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let shell = MockShell::with_responder(|_| Ok("v1.0\nv1.1\n".to_string()));
        let mut project = project(&shell, dir.path());
        let editor = ScriptedEditor::replying(Some("unused"));

        let mut workflow = ReleaseWorkflow::new(&mut project, &editor);
        let err = workflow
            .run(&Version::parse("1.1").unwrap(), None)
            .unwrap_err();

        assert!(matches!(err, AttributionError::DuplicateRelease(name) if name == "v1.1"));
        assert_eq!(workflow.state(), ReleaseState::Idle);
        assert!(editor.seen.borrow().is_none());
        assert!(!has_mutation(&shell));
    }

    #[test]
    fn test_cancelled_by_empty_message() {
        let dir = tempfile::tempdir().unwrap();
        let shell = MockShell::new();
        let mut project = project(&shell, dir.path());
        let editor = ScriptedEditor::replying(Some("# only comments\n\n"));

        let mut workflow = ReleaseWorkflow::new(&mut project, &editor);
        let outcome = workflow.run(&Version::parse("0.1").unwrap(), None).unwrap();

        assert_eq!(outcome, ReleaseOutcome::Cancelled);
        assert_eq!(workflow.state(), ReleaseState::Idle);
        assert!(!has_mutation(&shell));
    }

    #[test]
    fn test_cancelled_by_aborted_editor() {
        let dir = tempfile::tempdir().unwrap();
        let shell = MockShell::new();
        let mut project = project(&shell, dir.path());
        let editor = ScriptedEditor::replying(None);

        let mut workflow = ReleaseWorkflow::new(&mut project, &editor);
        let outcome = workflow.run(&Version::parse("0.1").unwrap(), None).unwrap();

        assert_eq!(outcome, ReleaseOutcome::Cancelled);
        assert!(!has_mutation(&shell));
    }

    #[test]
    fn test_template_lists_commits_since_latest_release() {
        let dir = tempfile::tempdir().unwrap();
        let shell = MockShell::with_responder(|command| {
            let argv = command.argv();
            Ok(match argv.as_slice() {
                ["git", "tag", "--list"] => "v1.0\n".to_string(),
                ["git", "log", ..] => "abc1234 Fix widgets\ndef5678 Add gadgets".to_string(),
                _ => String::new(),
            })
        });
        let mut project = project(&shell, dir.path());
        project.config.ignored_authors = vec!["bot".to_string()];
        let editor = ScriptedEditor::replying(Some("Gadgets!\n# trailing comment\n"));

        let mut workflow = ReleaseWorkflow::new(&mut project, &editor);
        let outcome = workflow.run(&Version::parse("1.1").unwrap(), None).unwrap();
        assert!(matches!(outcome, ReleaseOutcome::Released(_)));

        let template = editor.seen.borrow().clone().unwrap();
        assert!(template.starts_with("1.1\n\n"));
        assert!(template.contains("# Commits since v1.0:"));
        assert!(template.contains("#   abc1234 Fix widgets\n#   def5678 Add gadgets\n"));

        let log_call = shell
            .calls()
            .into_iter()
            .find(|c| c.args.first().map(String::as_str) == Some("log"))
            .unwrap();
        assert!(log_call.args.contains(&"--author=^((?!(bot)).*)$".to_string()));
        assert_eq!(log_call.args.last().map(String::as_str), Some("v1.0..HEAD"));

        let tag_calls: Vec<Vec<String>> = shell
            .argvs()
            .into_iter()
            .filter(|argv| argv[1] == "tag" && argv.get(2).map(String::as_str) != Some("--list"))
            .collect();
        assert_eq!(tag_calls[0], vec!["git", "tag", "--annotate", "v1.1", "-m", "Gadgets!"]);
    }

    #[test]
    fn test_successful_release_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let shell = MockShell::new();
        let mut project = project(&shell, dir.path());
        project.config.version_file = true;
        project.config.signed_tags = true;
        let editor = ScriptedEditor::replying(None);

        let mut workflow = ReleaseWorkflow::new(&mut project, &editor);
        let outcome = workflow
            .run(&Version::parse("0.1").unwrap(), Some("First release\n"))
            .unwrap();

        assert_eq!(outcome, ReleaseOutcome::Released(Tag::from_name("v0.1").unwrap()));
        assert_eq!(workflow.state(), ReleaseState::Finalized);
        assert!(editor.seen.borrow().is_none());

        let mutations: Vec<Vec<String>> = shell
            .argvs()
            .into_iter()
            .filter(|argv| {
                matches!(argv[1].as_str(), "commit" | "add" | "tag")
                    && argv.get(2).map(String::as_str) != Some("--list")
            })
            .collect();
        let expected: Vec<Vec<&str>> = vec![
            vec!["git", "commit", "--allow-empty", "-m", "Version bump v0.1"],
            vec!["git", "tag", "--annotate", "v0.1", "-m", "First release"],
            vec!["git", "add", "CHANGELOG.md"],
            vec!["git", "add", "VERSION"],
            vec!["git", "commit", "--amend", "--no-edit"],
            vec!["git", "tag", "--force", "--sign", "v0.1", "-m", "First release"],
        ];
        assert_eq!(mutations, expected);

        assert!(dir.path().join("CHANGELOG.md").is_file());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("VERSION")).unwrap(),
            "0.1\n"
        );
        assert!(!dir.path().join(".attribution-0.1.txt").exists());
    }

    #[test]
    fn test_failure_after_tag_saves_message() {
        let dir = tempfile::tempdir().unwrap();
        let shell = MockShell::with_responder(|command| {
            if command.args.first().map(String::as_str) == Some("add") {
                Err(MockShell::failure("git add", 128))
            } else {
                Ok(String::new())
            }
        });
        let mut project = project(&shell, dir.path());
        let editor = ScriptedEditor::replying(Some("Release notes\n\nfor 1.1\n"));

        let mut workflow = ReleaseWorkflow::new(&mut project, &editor);
        let err = workflow
            .run(&Version::parse("1.1").unwrap(), None)
            .unwrap_err();

        assert!(matches!(
            err,
            AttributionError::ExternalCommand { exit_code: Some(128), .. }
        ));
        assert_eq!(workflow.state(), ReleaseState::Failed);

        let recovery = dir.path().join(".attribution-1.1.txt");
        assert_eq!(
            std::fs::read_to_string(recovery).unwrap(),
            "Release notes\n\nfor 1.1"
        );
        assert!(!shell
            .calls()
            .iter()
            .any(|c| c.args.contains(&"--amend".to_string())));
    }

    #[test]
    fn test_failed_commit_saves_message() {
        let dir = tempfile::tempdir().unwrap();
        let shell = MockShell::with_responder(|command| {
            if command.args.first().map(String::as_str) == Some("commit") {
                Err(MockShell::failure("git commit", 1))
            } else {
                Ok(String::new())
            }
        });
        let mut project = project(&shell, dir.path());
        let editor = ScriptedEditor::replying(None);

        let mut workflow = ReleaseWorkflow::new(&mut project, &editor);
        assert!(workflow
            .run(&Version::parse("2.0").unwrap(), Some("Two"))
            .is_err());
        assert_eq!(workflow.state(), ReleaseState::Failed);
        assert_eq!(
            std::fs::read_to_string(dir.path().join(".attribution-2.0.txt")).unwrap(),
            "Two"
        );
    }

    #[test]
    fn test_recovery_path() {
        let shell = MockShell::new();
        let mut project = project(&shell, std::path::Path::new("/repo"));
        let editor = ScriptedEditor::replying(None);
        let workflow = ReleaseWorkflow::new(&mut project, &editor);
        assert_eq!(
            workflow.recovery_path(&Version::parse("1.1").unwrap()),
            PathBuf::from("/repo/.attribution-1.1.txt")
        );
    }
}
