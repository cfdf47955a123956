use crate::error::{AttributionError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Name of the dedicated configuration file at the repository root
pub const CONFIG_FILE: &str = "attribution.toml";

/// Settings for changelog generation and release tagging.
///
/// Read from `attribution.toml`, or from `[package.metadata.attribution]` in a
/// Cargo manifest. Every key is optional.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Project name used as the changelog title
    #[serde(default)]
    pub name: Option<String>,

    /// Commit authors left out of commit logs and contributor lists
    #[serde(default)]
    pub ignored_authors: Vec<String>,

    /// Whether releases also write a standalone version file
    #[serde(default)]
    pub version_file: bool,

    #[serde(default = "default_version_path")]
    pub version_path: String,

    /// Whether release tags are signed with `git tag --sign`
    #[serde(default = "default_signed_tags")]
    pub signed_tags: bool,

    #[serde(default = "default_changelog_path")]
    pub changelog_path: String,

    /// Whether `generate` also writes a contributors file
    #[serde(default)]
    pub contributors: bool,

    #[serde(default = "default_contributors_path")]
    pub contributors_path: String,
}

fn default_version_path() -> String {
    "VERSION".to_string()
}

fn default_signed_tags() -> bool {
    true
}

fn default_changelog_path() -> String {
    "CHANGELOG.md".to_string()
}

fn default_contributors_path() -> String {
    "CONTRIBUTORS".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            name: None,
            ignored_authors: Vec::new(),
            version_file: false,
            version_path: default_version_path(),
            signed_tags: default_signed_tags(),
            changelog_path: default_changelog_path(),
            contributors: false,
            contributors_path: default_contributors_path(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct CargoManifest {
    #[serde(default)]
    package: Option<CargoPackage>,
}

#[derive(Debug, Deserialize, Default)]
struct CargoPackage {
    name: Option<String>,
    #[serde(default)]
    metadata: Option<CargoMetadata>,
}

#[derive(Debug, Deserialize, Default)]
struct CargoMetadata {
    attribution: Option<Config>,
}

/// Parse a configuration document in `attribution.toml` format
pub fn parse_config(text: &str) -> Result<Config> {
    toml::from_str(text).map_err(|e| AttributionError::config(e.to_string()))
}

/// Package name and `[package.metadata.attribution]` table of a Cargo manifest
fn read_cargo_manifest(path: &Path) -> Result<(Option<String>, Option<Config>)> {
    let text = fs::read_to_string(path)?;
    let manifest: CargoManifest = toml::from_str(&text)
        .map_err(|e| AttributionError::config(format!("{}: {}", path.display(), e)))?;

    Ok(match manifest.package {
        Some(package) => (
            package.name,
            package.metadata.and_then(|m| m.attribution),
        ),
        None => (None, None),
    })
}

/// Loads configuration for the project rooted at `root`.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `attribution.toml` in the project root
/// 3. `[package.metadata.attribution]` in the project's `Cargo.toml`
/// 4. `attribution.toml` in the user config directory
/// 5. Default configuration if nothing is found
///
/// When no name is configured, the Cargo package name is used, then the name
/// of the root directory.
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration, with `name` filled in
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(root: &Path, config_path: Option<&Path>) -> Result<Config> {
    let manifest_path = root.join("Cargo.toml");
    let (package_name, manifest_config) = if manifest_path.is_file() {
        read_cargo_manifest(&manifest_path)?
    } else {
        (None, None)
    };

    let local_path = root.join(CONFIG_FILE);

    let mut config = if let Some(path) = config_path {
        debug!("loading config from {}", path.display());
        parse_config(&fs::read_to_string(path)?)?
    } else if local_path.is_file() {
        debug!("loading config from {}", local_path.display());
        parse_config(&fs::read_to_string(&local_path)?)?
    } else if let Some(config) = manifest_config {
        debug!("loading config from {}", manifest_path.display());
        config
    } else if let Some(user_path) = dirs::config_dir()
        .map(|dir| dir.join(CONFIG_FILE))
        .filter(|path| path.is_file())
    {
        debug!("loading config from {}", user_path.display());
        parse_config(&fs::read_to_string(&user_path)?)?
    } else {
        Config::default()
    };

    if config.name.as_deref().map_or(true, str::is_empty) {
        config.name = package_name.or_else(|| {
            root.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        });
    }

    Ok(config)
}
