use std::path::{Path, PathBuf};

use anyhow::Context as _;
use codestamp::{Settings, TextFile, Workspace};
use tracing::instrument;

mod attach;
mod clear;
mod list;
mod show;

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: MetaCommand,
}

#[derive(Debug, clap::Parser)]
enum MetaCommand {
    /// Tag a span of a document and store a metadata record for it
    Attach(attach::Command),

    /// Show the metadata record at a location
    Show(show::Command),

    /// List every tagged span of a document
    List(list::Command),

    /// Remove a tag and its metadata record, keeping the tagged text
    Clear(clear::Command),
}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self.command {
            MetaCommand::Attach(command) => command.run(root),
            MetaCommand::Show(command) => command.run(root),
            MetaCommand::List(command) => command.run(root),
            MetaCommand::Clear(command) => command.run(root),
        }
    }
}

/// A document together with its metadata settings.
struct Context {
    workspace: Workspace,
    file: TextFile,
    settings: Settings,
}

impl Context {
    fn load(root: PathBuf, document: &Path) -> anyhow::Result<Self> {
        let (workspace, file) = super::open_document(root, document)?;
        let settings = workspace.load_settings(document)?;
        Ok(Self {
            workspace,
            file,
            settings,
        })
    }

    /// Writes the document first, so a failed write leaves settings untouched.
    fn save(&mut self, document: &Path) -> anyhow::Result<()> {
        self.file
            .save()
            .with_context(|| format!("failed to save {}", self.file.path().display()))?;
        self.workspace.save_settings(document, &self.settings)?;
        Ok(())
    }
}

fn print_record(record: &codestamp::MetadataRecord) {
    println!("  Target:        {}", record.target);
    if let Some(link) = &record.link {
        println!("  Link:          {link}");
    }
    if !record.references.is_empty() {
        println!("  References:    {}", record.references.join(", "));
    }
    if !record.alt_tags.is_empty() {
        println!("  Alt tags:      {}", record.alt_tags.join(", "));
    }
    if let Some(functionality) = &record.functionality {
        println!("  Functionality: {functionality}");
    }
    println!(
        "  Updated:       {}",
        record.updated.format("%Y-%m-%d %H:%M:%S UTC")
    );
}
