use crate::error::Result;
use crate::generate::GeneratedFile;
use crate::project::Project;
use std::path::PathBuf;

/// Plain-text file holding the newest released version
pub struct VersionFile;

impl GeneratedFile for VersionFile {
    fn relative_path(&self, project: &Project) -> PathBuf {
        PathBuf::from(&project.config.version_path)
    }

    fn generate(&self, project: &Project) -> Result<String> {
        Ok(format!("{}\n", project.latest_tag()?.version))
    }
}
