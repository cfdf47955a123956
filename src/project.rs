use crate::config::{load_config, Config};
use crate::domain::Tag;
use crate::error::Result;
use crate::git::{discover_root, Shell, ShellCommand, SystemShell, TagRepository};
use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use tracing::error;

/// A repository being released, and the context every operation runs in
///
/// Holds the shell used for git commands, the loaded configuration, and the
/// release tags, which are read once and then kept for the life of the value.
pub struct Project {
    pub name: String,
    pub root: PathBuf,
    pub config: Config,
    shell: Box<dyn Shell>,
    tags: OnceCell<Vec<Tag>>,
    shortlog: OnceCell<String>,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        config: Config,
        shell: Box<dyn Shell>,
    ) -> Self {
        Project {
            name: name.into(),
            root: root.into(),
            config,
            shell,
            tags: OnceCell::new(),
            shortlog: OnceCell::new(),
        }
    }

    /// Open the repository containing `path`, running git in its root
    pub fn load(path: &Path, config_path: Option<&Path>) -> Result<Self> {
        let root = discover_root(path)?;
        let config = load_config(&root, config_path)?;
        let name = config.name.clone().unwrap_or_default();
        let shell = SystemShell::in_dir(&root);

        Ok(Project::new(name, root, config, Box::new(shell)))
    }

    pub fn shell(&self) -> &dyn Shell {
        self.shell.as_ref()
    }

    pub fn repository(&self) -> TagRepository<'_> {
        TagRepository::new(self.shell.as_ref(), &self.config.ignored_authors)
    }

    /// Release tags, newest first
    pub fn tags(&self) -> Result<&[Tag]> {
        if let Some(tags) = self.tags.get() {
            return Ok(tags);
        }

        let tags = self.repository().all_tags()?;
        Ok(self.tags.get_or_init(|| tags))
    }

    /// The newest release, or the null tag before the first one
    pub fn latest_tag(&self) -> Result<Tag> {
        Ok(self.tags()?.first().cloned().unwrap_or_else(Tag::null))
    }

    /// Add a freshly created tag to the known releases, keeping them sorted
    pub fn insert_tag(&mut self, tag: Tag) -> Result<()> {
        self.tags()?;
        if let Some(tags) = self.tags.get_mut() {
            tags.retain(|existing| existing.name != tag.name);
            tags.push(tag);
            tags.sort_by(|a, b| b.version.cmp(&a.version));
        }
        Ok(())
    }

    pub fn shortlog_command(&self) -> ShellCommand {
        ShellCommand::git(["shortlog", "-s", "HEAD"])
    }

    /// Per-author commit counts across the whole history, or empty if git fails
    pub fn shortlog(&self) -> &str {
        self.shortlog.get_or_init(|| {
            match self.shell.run(&self.shortlog_command()) {
                Ok(out) => out.trim_end().to_string(),
                Err(err) => {
                    error!("failed to generate shortlog for {}: {}", self.name, err);
                    String::new()
                }
            }
        })
    }

    /// Path of a file relative to the repository root
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("name", &self.name)
            .field("root", &self.root)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
