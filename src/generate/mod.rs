//! Files rendered from a project's release history
//!
//! Each artifact implements [GeneratedFile]: it knows where it lives in the
//! repository and how to render itself from a [Project]. Rendering is pure
//! with respect to the tag sequence, so regenerating from unchanged history
//! produces identical bytes.

pub mod changelog;
pub mod contributors;
pub mod version_file;

pub use changelog::Changelog;
pub use contributors::Contributors;
pub use version_file::VersionFile;

use crate::error::Result;
use crate::git::ShellCommand;
use crate::project::Project;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// A file whose content is derived from the project and its tags
pub trait GeneratedFile {
    /// Location relative to the repository root
    fn relative_path(&self, project: &Project) -> PathBuf;

    /// Render the full file content
    fn generate(&self, project: &Project) -> Result<String>;

    /// Render and write the file, returning its path relative to the root
    fn write(&self, project: &Project) -> Result<PathBuf> {
        let relative = self.relative_path(project);
        let content = self.generate(project)?;
        let path = project.path(&relative);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        info!("wrote {}", path.display());

        Ok(relative)
    }

    /// Write the file and stage it with `git add`
    fn write_and_stage(&self, project: &Project) -> Result<PathBuf> {
        let relative = self.write(project)?;
        project.shell().run(
            &ShellCommand::git(["add"]).arg(relative.to_string_lossy().into_owned()),
        )?;
        Ok(relative)
    }
}

/// Artifacts enabled by the project's configuration, changelog first
pub fn configured_files(project: &Project) -> Vec<Box<dyn GeneratedFile>> {
    let mut files: Vec<Box<dyn GeneratedFile>> = vec![Box::new(Changelog)];
    if project.config.version_file {
        files.push(Box::new(VersionFile));
    }
    if project.config.contributors {
        files.push(Box::new(Contributors));
    }
    files
}

/// Heading with an underline the same width as the title
pub(crate) fn heading(title: &str, underline: char) -> String {
    let width = title.chars().count();
    format!("{}\n{}\n", title, underline.to_string().repeat(width))
}
