use crate::error::{AttributionError, Result};
use regex::Regex;
use semver::{BuildMetadata, Prerelease};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(0|[1-9]\d*)(?:\.(0|[1-9]\d*))?(?:\.(0|[1-9]\d*))?(?:-([0-9A-Za-z.-]+))?(?:\+([0-9A-Za-z.-]+))?$",
        )
        .expect("version pattern is valid")
    })
}

/// Semantic version parsed from a release tag
///
/// Minor and patch segments may be omitted (`1.0`, `2`), in which case they
/// order as zero. The text the version was parsed from is kept for display,
/// so `v1.1` round-trips as `1.1` rather than `1.1.0`.
#[derive(Debug, Clone)]
pub struct Version {
    inner: semver::Version,
    text: String,
}

impl Version {
    /// Parse a version string such as `1.2`, `1.2.3` or `1.2.3-rc.1+build`
    pub fn parse(text: &str) -> Result<Self> {
        let caps = version_re()
            .captures(text)
            .ok_or_else(|| AttributionError::version(text))?;

        let segment = |i: usize| -> Result<u64> {
            caps.get(i)
                .map(|m| m.as_str().parse::<u64>())
                .transpose()
                .map(|n| n.unwrap_or(0))
                .map_err(|_| AttributionError::version(text))
        };

        let mut inner = semver::Version::new(segment(1)?, segment(2)?, segment(3)?);
        if let Some(pre) = caps.get(4) {
            inner.pre =
                Prerelease::new(pre.as_str()).map_err(|_| AttributionError::version(text))?;
        }
        if let Some(build) = caps.get(5) {
            inner.build =
                BuildMetadata::new(build.as_str()).map_err(|_| AttributionError::version(text))?;
        }

        Ok(Version {
            inner,
            text: text.to_string(),
        })
    }

    /// Parse the version out of a tag name, dropping a leading `v` or `V`
    pub fn from_tag_name(name: &str) -> Result<Self> {
        let clean = name
            .strip_prefix('v')
            .or_else(|| name.strip_prefix('V'))
            .unwrap_or(name);
        Self::parse(clean).map_err(|_| AttributionError::version(name))
    }

    pub fn major(&self) -> u64 {
        self.inner.major
    }

    pub fn minor(&self) -> u64 {
        self.inner.minor
    }

    pub fn patch(&self) -> u64 {
        self.inner.patch
    }

    pub fn is_prerelease(&self) -> bool {
        !self.inner.pre.is_empty()
    }

    /// Conventional tag name for this version (`v1.2`)
    pub fn tag_name(&self) -> String {
        format!("v{}", self.text)
    }
}

impl FromStr for Version {
    type Err = AttributionError;

    fn from_str(s: &str) -> Result<Self> {
        Version::from_tag_name(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// Precedence ignores build metadata; `Prerelease::EMPTY` sorts after any
// non-empty pre-release.
impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let a = &self.inner;
        let b = &other.inner;
        (a.major, a.minor, a.patch)
            .cmp(&(b.major, b.minor, b.patch))
            .then_with(|| a.pre.cmp(&b.pre))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}
