use crate::domain::{Tag, Version};
use crate::error::{AttributionError, Result};
use crate::git::{Shell, ShellCommand};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Locate the working tree root of the repository containing `path`
pub fn discover_root<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let repo = git2::Repository::discover(path)?;
    repo.workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| AttributionError::Git(git2::Error::from_str("bare repositories have no working tree")))
}

/// Locate the `.git` directory of the repository containing `path`
pub fn discover_git_dir<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let repo = git2::Repository::discover(path)?;
    Ok(repo.path().to_path_buf())
}

/// Release tags of a repository, read and written through a [Shell]
pub struct TagRepository<'a> {
    shell: &'a dyn Shell,
    ignored_authors: &'a [String],
}

impl<'a> TagRepository<'a> {
    pub fn new(shell: &'a dyn Shell, ignored_authors: &'a [String]) -> Self {
        TagRepository {
            shell,
            ignored_authors,
        }
    }

    /// Every tag whose name parses as a version, newest first
    ///
    /// Tags that are not versions, such as feature markers, are skipped with a
    /// warning.
    pub fn all_tags(&self) -> Result<Vec<Tag>> {
        let output = self.shell.run(&ShellCommand::git(["tag", "--list"]))?;

        let mut tags: Vec<Tag> = output
            .lines()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter_map(|name| match Tag::from_name(name) {
                Ok(tag) => Some(tag),
                Err(_) => {
                    warn!("Skipping tag {}", name);
                    None
                }
            })
            .collect();

        tags.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(tags)
    }

    /// The tag carrying `version`, if any
    pub fn find_by_version(&self, version: &Version) -> Result<Option<Tag>> {
        Ok(self
            .all_tags()?
            .into_iter()
            .find(|tag| &tag.version == version))
    }

    /// `git log` listing commits since `tag`, oldest first
    ///
    /// `None` and the null tag both mean the whole history. Commits by ignored
    /// authors are filtered out with a negative lookahead on the author field.
    pub fn shortlog_since(&self, tag: Option<&Tag>) -> ShellCommand {
        let mut command = ShellCommand::git(["log", "--reverse", "--pretty=format:%h %s"]);

        if let Some(filter) = author_filter(self.ignored_authors) {
            command = command.arg("--perl-regexp").arg(format!("--author={}", filter));
        }

        match tag {
            Some(tag) if !tag.is_null() => command.arg(format!("{}..HEAD", tag.name)),
            _ => command,
        }
    }

    /// Create a `v<version>` tag at HEAD
    pub fn create(&self, version: &Version, message: &str, signed: bool) -> Result<Tag> {
        Tag::create(self.shell, version, message, signed)
    }

    /// Move `tag` to HEAD, optionally replacing its message
    pub fn update(&self, tag: &mut Tag, message: Option<&str>, signed: bool) -> Result<()> {
        tag.update(self.shell, message, signed)
    }
}

/// Perl-compatible pattern matching any author except the ignored ones
pub fn author_filter(ignored_authors: &[String]) -> Option<String> {
    if ignored_authors.is_empty() {
        return None;
    }

    let names: Vec<String> = ignored_authors
        .iter()
        .map(|name| regex::escape(name))
        .collect();

    Some(format!("^((?!({})).*)$", names.join("|")))
}
