use crate::error::Result;
use crate::generate::{heading, GeneratedFile};
use crate::git::ShellCommand;
use crate::project::Project;
use std::path::PathBuf;

/// Contributor list, most commits first, without ignored authors
pub struct Contributors;

impl Contributors {
    pub fn command() -> ShellCommand {
        ShellCommand::git(["shortlog", "-sn", "HEAD"])
    }

    /// Author names from `git shortlog -sn` output, in the order given
    pub fn parse_names(shortlog: &str) -> Vec<String> {
        shortlog
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                let (count, name) = line.split_once('\t')?;
                count.trim().parse::<u64>().ok()?;
                Some(name.trim().to_string())
            })
            .filter(|name| !name.is_empty())
            .collect()
    }
}

impl GeneratedFile for Contributors {
    fn relative_path(&self, project: &Project) -> PathBuf {
        PathBuf::from(&project.config.contributors_path)
    }

    fn generate(&self, project: &Project) -> Result<String> {
        let output = project.shell().run(&Self::command())?;
        let ignored = &project.config.ignored_authors;

        let mut out = heading("Contributors", '=');
        out.push('\n');
        for name in Self::parse_names(&output)
            .into_iter()
            .filter(|name| !ignored.contains(name))
        {
            out.push_str(&name);
            out.push('\n');
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::git::MockShell;

    #[test]
    fn test_parse_names() {
        let output = "    12\tAlice Example\n     3\tdependabot[bot]\ngarbage\n     1\tBob\n";
        assert_eq!(
            Contributors::parse_names(output),
            vec!["Alice Example", "dependabot[bot]", "Bob"]
        );
    }

    #[test]
    fn test_generate_skips_ignored_authors() {
        let shell = MockShell::new();
        shell.push_output("    12\tAlice Example\n     3\tdependabot[bot]\n     1\tBob\n");

        let mut config = Config::default();
        config.ignored_authors = vec!["dependabot[bot]".to_string()];
        let project = Project::new("p", "/p", config, Box::new(shell.clone()));

        assert_eq!(
            Contributors.generate(&project).unwrap(),
            "Contributors\n============\n\nAlice Example\nBob\n"
        );
        assert_eq!(shell.last_call(), Some(Contributors::command()));
    }

    #[test]
    fn test_generate_propagates_git_failure() {
        let shell = MockShell::new();
        shell.push_failure(128);
        let project = Project::new("p", "/p", Config::default(), Box::new(shell));
        assert!(Contributors.generate(&project).is_err());
    }
}
