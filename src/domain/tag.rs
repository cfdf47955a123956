use crate::domain::version::Version;
use crate::error::{AttributionError, Result};
use crate::git::{Shell, ShellCommand};
use regex::Regex;
use std::cell::OnceCell;
use std::cmp::Ordering;
use std::sync::OnceLock;
use tracing::{debug, error, warn};

fn tag_object_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^object\s+(\w+)\ntype\s+(\w+)\ntag\s+(.+)\ntagger\s(.+)\n\n((?s:.*))$")
            .expect("tag object pattern is valid")
    })
}

fn signature_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)-----BEGIN (?:PGP|SSH) SIGNATURE-----.+?-----END (?:PGP|SSH) SIGNATURE-----\n?")
            .expect("signature pattern is valid")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TagMessage {
    body: String,
    signature: Option<String>,
}

/// Split the output of `git cat-file tag` into message body and signature
fn parse_tag_object(name: &str, contents: &str) -> Result<TagMessage> {
    let caps = tag_object_re()
        .captures(contents)
        .ok_or_else(|| AttributionError::TagHeaderMismatch(name.to_string()))?;

    let content = caps.get(5).map_or("", |m| m.as_str());

    match signature_re().find(content) {
        Some(sig) => {
            let mut body = String::with_capacity(content.len() - sig.len());
            body.push_str(&content[..sig.start()]);
            body.push_str(&content[sig.end()..]);
            Ok(TagMessage {
                body,
                signature: Some(sig.as_str().to_string()),
            })
        }
        None => Ok(TagMessage {
            body: content.to_string(),
            signature: None,
        }),
    }
}

/// Whether `name` is a tag in the repository, as opposed to the object id
/// `git describe --always` prints when no tag precedes a commit
fn is_tag(shell: &dyn Shell, name: &str) -> bool {
    let reference = format!("refs/tags/{}", name);
    shell
        .run(&ShellCommand::git([
            "rev-parse",
            "--verify",
            "--quiet",
            reference.as_str(),
        ]))
        .is_ok()
}

/// A release tag in the repository
///
/// The message, signature and shortlog are fetched from git the first time
/// they are asked for and memoized on this instance.
#[derive(Debug, Clone)]
pub struct Tag {
    pub name: String,
    pub version: Version,
    message: OnceCell<TagMessage>,
    shortlog_command: OnceCell<ShellCommand>,
    shortlog: OnceCell<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Tag {
            name: name.into(),
            version,
            message: OnceCell::new(),
            shortlog_command: OnceCell::new(),
            shortlog: OnceCell::new(),
        }
    }

    /// Build a tag from its name, parsing the version out of it
    pub fn from_name(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let version = Version::from_tag_name(&name)?;
        Ok(Tag::new(name, version))
    }

    /// Stand-in for "no releases yet"
    ///
    /// Version `0`, empty name, empty message and shortlog. It never runs a
    /// command.
    pub fn null() -> Self {
        let tag = Tag::new("", Version::parse("0").expect("`0` is a valid version"));
        let _ = tag.message.set(TagMessage {
            body: String::new(),
            signature: None,
        });
        let _ = tag.shortlog.set(String::new());
        tag
    }

    pub fn is_null(&self) -> bool {
        self.name.is_empty()
    }

    /// The tag annotation, without any signature block
    ///
    /// A tag object that doesn't have the expected header yields an empty
    /// message and a warning. Failure to read the tag object at all is
    /// returned to the caller.
    pub fn message(&self, shell: &dyn Shell) -> Result<&str> {
        if let Some(message) = self.message.get() {
            return Ok(&message.body);
        }

        let contents = shell.run(&ShellCommand::git(["cat-file", "tag", self.name.as_str()]))?;

        let message = match parse_tag_object(&self.name, &contents) {
            Ok(message) => message,
            Err(err) => {
                warn!("{}", err);
                debug!("{}", contents);
                TagMessage {
                    body: String::new(),
                    signature: None,
                }
            }
        };

        Ok(&self.message.get_or_init(|| message).body)
    }

    /// Signature block removed from the message, once the message was fetched
    pub fn signature(&self) -> Option<&str> {
        self.message.get().and_then(|m| m.signature.as_deref())
    }

    /// The `git shortlog` invocation covering this release
    ///
    /// The range starts at the nearest tag before this one. For the earliest
    /// release `git describe --always` falls back to an object id, and the
    /// range becomes everything reachable from this tag.
    pub fn shortlog_command(&self, shell: &dyn Shell) -> Result<&ShellCommand> {
        if let Some(command) = self.shortlog_command.get() {
            return Ok(command);
        }

        let parent = format!("{}~1", self.name);
        let base = shell.run(&ShellCommand::git([
            "describe", "--tags", "--abbrev=0", "--always", parent.as_str(),
        ]))?;
        let base = base.trim();

        let range = if !base.is_empty()
            && Version::from_tag_name(base).is_ok()
            && is_tag(shell, base)
        {
            format!("{}...{}", base, self.name)
        } else {
            self.name.clone()
        };

        let command = ShellCommand::git(["shortlog", "-s"]).arg(range);
        Ok(self.shortlog_command.get_or_init(|| command))
    }

    /// Per-author commit counts for this release, or empty if git fails
    pub fn shortlog(&self, shell: &dyn Shell) -> &str {
        if let Some(shortlog) = self.shortlog.get() {
            return shortlog;
        }

        let shortlog = match self
            .shortlog_command(shell)
            .and_then(|command| shell.run(command))
        {
            Ok(out) => out.trim_end().to_string(),
            Err(err) => {
                error!("failed to generate shortlog for {}: {}", self.name, err);
                String::new()
            }
        };

        self.shortlog.get_or_init(|| shortlog)
    }

    /// Create a new `v<version>` tag at HEAD
    pub fn create(shell: &dyn Shell, version: &Version, message: &str, signed: bool) -> Result<Tag> {
        let name = version.tag_name();
        shell.run(&ShellCommand::git([
            "tag",
            sign_flag(signed),
            name.as_str(),
            "-m",
            message,
        ]))?;

        Ok(Tag::new(name, version.clone()))
    }

    /// Move this tag to HEAD, keeping the current message unless one is given
    pub fn update(&mut self, shell: &dyn Shell, message: Option<&str>, signed: bool) -> Result<()> {
        let message = match message {
            Some(message) => {
                self.message = OnceCell::new();
                message.to_string()
            }
            None => self.message(shell)?.to_string(),
        };

        shell.run(&ShellCommand::git([
            "tag",
            "--force",
            sign_flag(signed),
            self.name.as_str(),
            "-m",
            message.as_str(),
        ]))?;

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn has_cached_message(&self) -> bool {
        self.message.get().is_some()
    }
}

fn sign_flag(signed: bool) -> &'static str {
    if signed {
        "--sign"
    } else {
        "--annotate"
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version
    }
}

impl Eq for Tag {}

/// Tags order by version alone; two tags with equal versions but different
/// names compare `Equal` without being `==`.
impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.version.cmp(&other.version))
    }
}
