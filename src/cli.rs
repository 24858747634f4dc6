use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

mod generate;
mod insert;
mod meta;
mod scan;
mod status;
mod terminal;

use anyhow::Context;
use clap::ArgAction;
use codestamp::{Selection, TextFile, Workspace};
use generate::Generate;
use insert::Insert;
use scan::Scan;
use status::Status;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The workspace root holding the `.codestamp` directory
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Initialize a workspace with a default configuration
    Init,

    /// List the codes already present in a document
    Scan(Scan),

    /// Count the distinct codes already present in a document
    Count(DocumentArg),

    /// Generate a code that does not yet occur in a document
    ///
    /// The code is kept pending until it is inserted or reset.
    Generate(Generate),

    /// Insert the pending code into a document
    Insert(Insert),

    /// Discard the pending code of a document
    Reset(DocumentArg),

    /// Show the pending code and code counts of a document
    Status(Status),

    /// Attach, show, list and clear span metadata
    Meta(meta::Command),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init => Init::run(root)?,
            Self::Scan(command) => command.run(root)?,
            Self::Count(document) => Count::run(root, &document.document)?,
            Self::Generate(command) => command.run(root)?,
            Self::Insert(command) => command.run(root)?,
            Self::Reset(document) => Reset::run(root, &document.document)?,
            Self::Status(command) => command.run(root)?,
            Self::Meta(command) => command.run(root)?,
        }
        Ok(())
    }
}

/// A single document argument.
#[derive(Debug, clap::Args)]
pub struct DocumentArg {
    /// Path to the document, relative to the workspace root
    document: PathBuf,
}

/// Opens the workspace and loads a document from it.
fn open_document(root: PathBuf, document: &Path) -> anyhow::Result<(Workspace, TextFile)> {
    let workspace = Workspace::open(root)?;
    let path = workspace.document_path(document);
    let file = TextFile::open(&path)
        .with_context(|| format!("failed to open document {}", path.display()))?;
    Ok((workspace, file))
}

/// A location in a document given on the command line.
///
/// Accepts `end`, a byte offset (`42`), or a byte range (`10..16`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Location {
    /// A caret after the last byte.
    #[default]
    End,
    /// A caret at a byte offset.
    Offset(usize),
    /// A byte range to replace.
    Range(usize, usize),
}

impl Location {
    fn resolve(self, text: &str) -> Selection {
        match self {
            Self::End => Selection::caret(text.len()),
            Self::Offset(offset) => Selection::caret(offset),
            Self::Range(start, end) => Selection::new(start, end),
        }
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("end") {
            return Ok(Self::End);
        }

        let parse = |n: &str| {
            n.trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid location '{s}': expected 'end', N, or N..M"))
        };
        match s.split_once("..") {
            Some((start, end)) => Ok(Self::Range(parse(start)?, parse(end)?)),
            None => Ok(Self::Offset(parse(s)?)),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::End => f.write_str("end"),
            Self::Offset(offset) => write!(f, "{offset}"),
            Self::Range(start, end) => write!(f, "{start}..{end}"),
        }
    }
}

struct Init;

impl Init {
    #[instrument]
    fn run(root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::init(root)?;

        println!(
            "Initialized codestamp workspace in {}",
            workspace.root().display()
        );
        println!("  Created: .codestamp/config.toml");
        println!();
        println!("Next steps:");
        println!("  codestamp generate <DOCUMENT>");
        println!("  codestamp insert <DOCUMENT> --placeholder ____");

        Ok(())
    }
}

struct Count;

impl Count {
    #[instrument]
    fn run(root: PathBuf, document: &Path) -> anyhow::Result<()> {
        let (_, file) = open_document(root, document)?;
        let count = codestamp::count_existing_codes(&file)?;
        println!("{count}");
        Ok(())
    }
}

struct Reset;

impl Reset {
    #[instrument]
    fn run(root: PathBuf, document: &Path) -> anyhow::Result<()> {
        use terminal::Colorize;

        let workspace = Workspace::open(root)?;
        let mut session = workspace.load_session(document)?;

        if session.reset() {
            workspace.save_session(document, &session)?;
            println!("{}", "✅ Discarded pending code".success());
        } else {
            println!("{}", "No code pending".dim());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("end", Location::End; "end")]
    #[test_case("END", Location::End; "uppercase end")]
    #[test_case("42", Location::Offset(42); "offset")]
    #[test_case("10..16", Location::Range(10, 16); "range")]
    #[test_case(" 3 .. 5 ", Location::Range(3, 5); "padded range")]
    fn parse_location(input: &str, expected: Location) {
        assert_eq!(input.parse::<Location>().unwrap(), expected);
    }

    #[test_case("start"; "word")]
    #[test_case("-1"; "negative")]
    #[test_case("1..x"; "bad range end")]
    #[test_case(""; "empty")]
    fn parse_location_rejects(input: &str) {
        assert!(input.parse::<Location>().is_err());
    }

    #[test]
    fn resolve_location() {
        assert_eq!(Location::End.resolve("abcd"), Selection::caret(4));
        assert_eq!(Location::Offset(1).resolve("abcd"), Selection::caret(1));
        assert_eq!(Location::Range(1, 3).resolve("abcd"), Selection::new(1, 3));
    }

    #[test]
    fn cli_parses_insert() {
        use clap::Parser;

        let cli = Cli::try_parse_from([
            "codestamp",
            "-vv",
            "--root",
            "/tmp/work",
            "insert",
            "doc.md",
            "--at",
            "3..7",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.root, PathBuf::from("/tmp/work"));
        assert!(matches!(cli.command, Command::Insert(_)));
    }

    #[test]
    fn cli_requires_subcommand() {
        use clap::Parser;

        assert!(Cli::try_parse_from(["codestamp"]).is_err());
    }
}
