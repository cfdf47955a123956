use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use attribution::cli::{ReleaseOutcome, ReleaseWorkflow};
use attribution::domain::Version;
use attribution::editor::SystemEditor;
use attribution::generate::{configured_files, Changelog, GeneratedFile};
use attribution::git::repository::discover_git_dir;
use attribution::project::Project;
use attribution::ui;

/// Scratch file for the release message, kept inside the git directory
const TAG_MESSAGE_FILE: &str = "ATTRIBUTION_TAGMSG";

#[derive(Parser)]
#[command(
    name = "attribution",
    version,
    about = "Tag releases and generate changelogs from annotated git tags"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Log every git command to stderr")]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Write the changelog, plus the version and contributors files when enabled
    Generate {
        #[arg(long, help = "Print the changelog instead of writing files")]
        stdout: bool,
    },
    /// Commit, tag and regenerate files for a new release
    Tag {
        /// Version to release, e.g. 1.2 or 2.0.0-rc.1
        version: String,

        #[arg(short, long, help = "Release message; opens an editor when omitted")]
        message: Option<String>,
    },
    /// Show commits since the latest release
    Log,
    /// List release tags, newest first
    List,
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let mut project = match Project::load(Path::new("."), args.config.as_deref()) {
        Ok(project) => project,
        Err(e) => {
            ui::display_error(&format!("Could not open project: {}", e));
            std::process::exit(1);
        }
    };

    let result = match args.command {
        None => print_changelog(&project),
        Some(Command::Generate { stdout: true }) => print_changelog(&project),
        Some(Command::Generate { stdout: false }) => generate(&project),
        Some(Command::Tag { version, message }) => tag(&mut project, &version, message.as_deref()),
        Some(Command::Log) => log(&project),
        Some(Command::List) => project.tags().map(ui::display_tags),
    };

    if let Err(e) = result {
        ui::display_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}

fn print_changelog(project: &Project) -> attribution::Result<()> {
    print!("{}", Changelog.generate(project)?);
    Ok(())
}

fn generate(project: &Project) -> attribution::Result<()> {
    for file in configured_files(project) {
        let path = file.write(project)?;
        ui::display_success(&format!("Wrote {}", path.display()));
    }
    Ok(())
}

fn tag(project: &mut Project, version: &str, message: Option<&str>) -> attribution::Result<()> {
    let version = Version::parse(version)?;
    let scratch = discover_git_dir(&project.root)?.join(TAG_MESSAGE_FILE);
    let editor = SystemEditor::new(scratch);

    ui::display_status(&format!("Releasing {} {}", project.name, version));
    let mut workflow = ReleaseWorkflow::new(project, &editor);
    match workflow.run(&version, message)? {
        ReleaseOutcome::Released(tag) => ui::display_success(&format!("Tagged {}", tag.name)),
        ReleaseOutcome::Cancelled => println!("Release cancelled, no message given."),
    }
    Ok(())
}

fn log(project: &Project) -> attribution::Result<()> {
    let latest = project.latest_tag()?;
    let command = project.repository().shortlog_since(Some(&latest));
    project.shell().run_interactive(&command)
}
